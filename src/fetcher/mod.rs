//! Remote content fetcher
//!
//! File-by-file acquisition over the hosting API: enumerate the tree
//! recursively (strictly sequentially, one listing request outstanding at a
//! time), download each candidate file's content and scan it with the
//! annotation matching policy.

use crate::core::validation::RepoId;
use crate::github::{ApiResult, ContentsResponse, GitHubHost};
use crate::keywords::{scan_text, KeywordSet, Match, MatchPolicy};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Files larger than this are never fetched.
pub const MAX_FILE_SIZE_BYTES: u64 = 500_000;

/// Extensions considered scannable source/text
const ALLOWED_EXTENSIONS: &[&str] = &[
    "c", "cfg", "conf", "cpp", "cs", "css", "go", "h", "hpp", "html", "ini", "java", "js", "json",
    "jsx", "kt", "lua", "md", "php", "pl", "py", "rb", "rs", "scala", "sh", "sql", "swift", "toml",
    "ts", "tsx", "txt", "vue", "xml", "yaml", "yml",
];

/// Traversal guards for the recursive listing
///
/// Explicit configuration rather than silent limits; hitting `max_files`
/// truncates enumeration with a warning, directories beyond `max_depth` are
/// pruned.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub max_depth: usize,
    pub max_files: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_files: 2000,
        }
    }
}

/// API-based fetch-and-scan over a repository's default branch
pub struct RemoteFetcher<'a> {
    host: &'a dyn GitHubHost,
    options: FetchOptions,
}

#[derive(Debug)]
struct Candidate {
    path: String,
}

impl<'a> RemoteFetcher<'a> {
    pub fn new(host: &'a dyn GitHubHost) -> Self {
        Self::with_options(host, FetchOptions::default())
    }

    pub fn with_options(host: &'a dyn GitHubHost, options: FetchOptions) -> Self {
        Self { host, options }
    }

    /// Fetch and scan every candidate file, returning all matches.
    pub async fn fetch(&self, repo: &RepoId, keywords: &KeywordSet) -> ApiResult<Vec<Match>> {
        let info = self.host.repository(repo).await?;
        let branch = info.default_branch;
        log::info!("remote fetch of {} (branch {})", repo, branch);

        let mut candidates = Vec::new();
        self.collect_candidates(repo, &branch, String::new(), 0, &mut candidates)
            .await?;
        if candidates.len() >= self.options.max_files {
            log::warn!(
                "file limit of {} reached for {}; remaining tree entries were skipped",
                self.options.max_files,
                repo
            );
        }

        let mut matches = Vec::new();
        for candidate in candidates {
            let response = self.host.contents(repo, &candidate.path, &branch).await?;
            let file = match response {
                ContentsResponse::File(file) => file,
                ContentsResponse::Listing(_) => {
                    log::warn!("expected file payload for '{}', got a listing", candidate.path);
                    continue;
                }
            };

            let text = match file.decoded_text() {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("skipping '{}': {}", candidate.path, e);
                    continue;
                }
            };

            let base = format!(
                "https://github.com/{}/{}/blob/{}/{}",
                repo.owner(),
                repo.name(),
                branch,
                candidate.path
            );
            matches.extend(scan_text(
                &text,
                keywords,
                MatchPolicy::Annotation,
                &candidate.path,
                |line| format!("{}#L{}", base, line),
            ));
        }

        log::info!("remote fetch of {} found {} matches", repo, matches.len());
        Ok(matches)
    }

    /// Sequential depth-first enumeration of the tree.
    fn collect_candidates<'b>(
        &'b self,
        repo: &'b RepoId,
        branch: &'b str,
        path: String,
        depth: usize,
        candidates: &'b mut Vec<Candidate>,
    ) -> BoxFuture<'b, ApiResult<()>> {
        async move {
            if depth > self.options.max_depth {
                log::debug!("pruning '{}' beyond depth {}", path, self.options.max_depth);
                return Ok(());
            }

            let response = self.host.contents(repo, &path, branch).await?;
            let entries = match response {
                ContentsResponse::Listing(entries) => entries,
                ContentsResponse::File(file) => {
                    // A file path was listed directly; treat it as one entry.
                    if is_scannable(&file.path, file.size) {
                        candidates.push(Candidate { path: file.path });
                    }
                    return Ok(());
                }
            };

            for entry in entries {
                if candidates.len() >= self.options.max_files {
                    return Ok(());
                }
                if entry.is_dir() {
                    self.collect_candidates(repo, branch, entry.path, depth + 1, candidates)
                        .await?;
                } else if entry.is_file() && is_scannable(&entry.path, entry.size) {
                    candidates.push(Candidate { path: entry.path });
                }
            }

            Ok(())
        }
        .boxed()
    }
}

fn is_scannable(path: &str, size: u64) -> bool {
    if size > MAX_FILE_SIZE_BYTES {
        log::debug!("skipping '{}': {} bytes exceeds ceiling", path, size);
        return false;
    }
    let extension = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase());
    match extension {
        Some(ext) => ALLOWED_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}
