//! Archive validation and extraction

use super::error::{ArchiveErrorKind, SnapshotError, SnapshotResult};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::result::ZipError;

/// Zip local-file-header signature
pub const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Check the first four bytes of the downloaded file.
///
/// Anything other than the zip signature deletes the file and fails; the rest
/// of the content is not inspected here.
pub fn validate_signature(path: &Path) -> SnapshotResult<()> {
    let mut file = fs::File::open(path)?;
    let mut magic = [0u8; 4];
    let mut read = 0;
    while read < magic.len() {
        match file.read(&mut magic[read..])? {
            0 => break,
            n => read += n,
        }
    }
    drop(file);

    if read < magic.len() || magic != ZIP_SIGNATURE {
        let _ = fs::remove_file(path);
        return Err(SnapshotError::InvalidArchive {
            kind: ArchiveErrorKind::Signature,
            message: format!("first bytes {:02x?} are not a zip signature", &magic[..read]),
        });
    }

    Ok(())
}

/// Extract all entries of `archive_path` into `dest`, overwriting existing
/// files.
///
/// Hosting-service zipballs wrap everything in a single `owner-name-sha/`
/// directory; when every entry shares one root component it is stripped so
/// extracted paths match repository paths. Entries that escape `dest` are
/// skipped.
pub fn extract(archive_path: &Path, dest: &Path) -> SnapshotResult<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(classify_zip_error)?;
    let root = common_root(&archive);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(classify_zip_error)?;
        let Some(enclosed) = entry.enclosed_name() else {
            log::warn!("skipping archive entry with unsafe path '{}'", entry.name());
            continue;
        };

        let relative = match &root {
            Some(root) => match enclosed.strip_prefix(root) {
                Ok(stripped) => stripped.to_path_buf(),
                Err(_) => enclosed,
            },
            None => enclosed,
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    Ok(())
}

/// First path component shared by every entry, if any.
fn common_root<R: Read + io::Seek>(archive: &zip::ZipArchive<R>) -> Option<PathBuf> {
    let mut root: Option<&str> = None;
    for name in archive.file_names() {
        let (first, _) = name.split_once('/')?;
        match root {
            None => root = Some(first),
            Some(existing) if existing == first => {}
            Some(_) => return None,
        }
    }
    root.map(PathBuf::from)
}

fn classify_zip_error(err: ZipError) -> SnapshotError {
    match err {
        ZipError::Io(io_err) => SnapshotError::Io(io_err),
        other => {
            let message = other.to_string();
            SnapshotError::InvalidArchive {
                kind: classify_message(&message),
                message,
            }
        }
    }
}

fn classify_message(message: &str) -> ArchiveErrorKind {
    let lowered = message.to_lowercase();
    if lowered.contains("central directory") {
        ArchiveErrorKind::CentralDirectory
    } else if lowered.contains("file header") || lowered.contains("entry") {
        ArchiveErrorKind::EntryHeader
    } else {
        ArchiveErrorKind::Other
    }
}
