//! Local filesystem scanner
//!
//! Walks an extracted snapshot tree, prunes version-control and build
//! directories, and scans readable text files line by line with the bare
//! substring matching policy.

mod error;

pub use error::{ScanError, ScanResult};

use crate::keywords::{scan_text, KeywordSet, Match, MatchPolicy};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Files larger than this are skipped without reading.
pub const MAX_FILE_SIZE_BYTES: u64 = 500_000;

/// Directory names pruned at any depth
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    "build",
    "dist",
    "node_modules",
    "out",
    "target",
    "vendor",
];

/// Consecutive control characters marking a file as binary
const CONTROL_RUN_LIMIT: usize = 50;

/// Scan every candidate file under `root`, building each match's source URL
/// from `link_base` plus the snapshot-relative path.
pub fn scan(root: &Path, keywords: &KeywordSet, link_base: &str) -> ScanResult<Vec<Match>> {
    // Surface an unreadable root as its own error instead of an empty result.
    fs::read_dir(root).map_err(|e| ScanError::Root {
        path: root.display().to_string(),
        source: e,
    })?;

    let link_base = link_base.trim_end_matches('/');
    let mut matches = Vec::new();
    let mut scanned = 0usize;

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walkdir metadata error"))
        })?;
        if metadata.len() > MAX_FILE_SIZE_BYTES {
            log::debug!(
                "skipping '{}': {} bytes exceeds ceiling",
                entry.path().display(),
                metadata.len()
            );
            continue;
        }

        let bytes = match fs::read(entry.path()) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("skipping '{}': {}", entry.path().display(), e);
                continue;
            }
        };
        if looks_binary(&bytes) {
            continue;
        }

        let text = String::from_utf8_lossy(&bytes);
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        matches.extend(scan_text(
            &text,
            keywords,
            MatchPolicy::Substring,
            &relative,
            |line| format!("{}/{}#L{}", link_base, relative, line),
        ));
        scanned += 1;
    }

    log::info!("scanned {} files under {}, {} matches", scanned, root.display(), matches.len());
    Ok(matches)
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| EXCLUDED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// A file is binary when it contains a NUL byte or a run of at least
/// `CONTROL_RUN_LIMIT` consecutive control characters (tabs and line endings
/// excepted).
fn looks_binary(bytes: &[u8]) -> bool {
    let mut run = 0usize;
    for &byte in bytes {
        if byte == 0 {
            return true;
        }
        let is_control = (byte < 0x20 && byte != b'\n' && byte != b'\r' && byte != b'\t')
            || byte == 0x7f;
        if is_control {
            run += 1;
            if run >= CONTROL_RUN_LIMIT {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
