//! Query orchestration
//!
//! Per invocation: try the local snapshot path unless the caller forces the
//! API, fall back to the remote fetcher on any local failure, and wrap the
//! winning result with the cache store. A rate-limit sentinel recorded for a
//! repository short-circuits remote attempts until it expires.

mod error;

pub use error::{QueryError, QueryResult};

use crate::cache::{CachePayload, MemoryCache};
use crate::core::time::TimeProvider;
use crate::core::validation::RepoId;
use crate::fetcher::{FetchOptions, RemoteFetcher};
use crate::github::{ApiError, ApiResult, GitHubHost};
use crate::keywords::{KeywordSet, Match};
use crate::scanner::{self, ScanError};
use crate::snapshot::{SnapshotError, SnapshotManager};
use std::path::PathBuf;
use std::sync::Arc;

/// One parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub repo: String,
    pub keywords: Vec<String>,
    pub force_api: bool,
}

/// Tunables fixed at construction time
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub cache_enabled: bool,
    pub cache_expiry_minutes: u64,
    pub fetch: FetchOptions,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_expiry_minutes: 30,
            fetch: FetchOptions::default(),
        }
    }
}

/// Failures on the local path; logged, then superseded by the fallback
#[derive(Debug, thiserror::Error)]
enum LocalError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Drives one repository query through acquisition, scan, cache and fallback.
pub struct Orchestrator {
    host: Arc<dyn GitHubHost>,
    snapshots: SnapshotManager,
    cache: MemoryCache,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(
        host: Arc<dyn GitHubHost>,
        cache_dir: PathBuf,
        time: Arc<dyn TimeProvider>,
        options: OrchestratorOptions,
    ) -> Self {
        let snapshots = SnapshotManager::new(host.clone(), cache_dir, time.clone());
        let cache = MemoryCache::new(time);
        Self {
            host,
            snapshots,
            cache,
            options,
        }
    }

    pub async fn run(&mut self, request: &QueryRequest) -> QueryResult<Vec<Match>> {
        let repo = RepoId::parse(&request.repo)?;
        let keywords = KeywordSet::new(request.keywords.iter().cloned());
        if keywords.is_empty() {
            return Err(QueryError::NoKeywords);
        }

        let match_key = match_key(&repo, &keywords);
        if self.options.cache_enabled {
            if let Some(CachePayload::Matches(cached)) = self.cache.get(&match_key) {
                log::debug!("serving {} from cache", repo);
                return Ok(cached.clone());
            }
        }

        let remote_blocked = matches!(
            self.cache.get(&rate_limit_key(&repo)),
            Some(CachePayload::RateLimited)
        );
        if remote_blocked {
            log::debug!("{} is marked rate-limited, remote path disabled", repo);
        }

        let matches = if request.force_api && !remote_blocked {
            self.remote_with_local_fallback(&repo, &keywords).await?
        } else {
            self.local_with_remote_fallback(&repo, &keywords, remote_blocked)
                .await?
        };

        if self.options.cache_enabled {
            self.cache.put(
                match_key,
                CachePayload::Matches(matches.clone()),
                self.options.cache_expiry_minutes,
            );
        }

        Ok(matches)
    }

    /// TryLocal -> RemoteFallback. With the remote path blocked by the
    /// sentinel, a local failure re-raises the rate-limit error instead.
    async fn local_with_remote_fallback(
        &mut self,
        repo: &RepoId,
        keywords: &KeywordSet,
        remote_blocked: bool,
    ) -> QueryResult<Vec<Match>> {
        match self.run_local(repo, keywords).await {
            Ok(matches) => Ok(matches),
            Err(local_err) => {
                log::warn!("local scan of {} failed: {}", repo, local_err);
                if remote_blocked {
                    return Err(QueryError::Api(ApiError::RateLimited {
                        repo: repo.to_string(),
                    }));
                }
                log::info!("falling back to API fetch for {}", repo);
                match self.run_remote(repo, keywords).await {
                    Ok(matches) => Ok(matches),
                    Err(e) => {
                        if e.is_rate_limited() {
                            self.note_rate_limited(repo);
                        }
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// RemoteOnly, with one local attempt before surfacing a rate limit.
    async fn remote_with_local_fallback(
        &mut self,
        repo: &RepoId,
        keywords: &KeywordSet,
    ) -> QueryResult<Vec<Match>> {
        match self.run_remote(repo, keywords).await {
            Ok(matches) => Ok(matches),
            Err(e) if e.is_rate_limited() => {
                self.note_rate_limited(repo);
                log::warn!("API fetch of {} rate-limited, trying local scan", repo);
                match self.run_local(repo, keywords).await {
                    Ok(matches) => Ok(matches),
                    Err(local_err) => {
                        log::warn!("local scan of {} failed: {}", repo, local_err);
                        Err(e.into())
                    }
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn run_local(
        &mut self,
        repo: &RepoId,
        keywords: &KeywordSet,
    ) -> Result<Vec<Match>, LocalError> {
        let snapshot = self.snapshots.ensure_local_snapshot(repo).await?;
        let link_base = format!(
            "https://github.com/{}/{}/blob/{}",
            repo.owner(),
            repo.name(),
            snapshot.branch
        );
        Ok(scanner::scan(&snapshot.root, keywords, &link_base)?)
    }

    async fn run_remote(&self, repo: &RepoId, keywords: &KeywordSet) -> ApiResult<Vec<Match>> {
        RemoteFetcher::with_options(self.host.as_ref(), self.options.fetch.clone())
            .fetch(repo, keywords)
            .await
    }

    fn note_rate_limited(&mut self, repo: &RepoId) {
        self.cache.put(
            rate_limit_key(repo),
            CachePayload::RateLimited,
            self.options.cache_expiry_minutes,
        );
    }
}

fn match_key(repo: &RepoId, keywords: &KeywordSet) -> String {
    format!("matches:{}:{}", repo, keywords.cache_token())
}

fn rate_limit_key(repo: &RepoId) -> String {
    format!("ratelimit:{}", repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::MockTimeProvider;
    use crate::github::types::{ContentEntry, ContentFile, ContentsResponse, RepositoryInfo};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::io::Write as _;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum RemoteMode {
        Ok,
        RateLimited,
        NotFound,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum ZipballMode {
        Ok,
        Garbage,
        Fail,
    }

    struct FakeHost {
        listings: Mutex<HashMap<String, Vec<ContentEntry>>>,
        files: Mutex<HashMap<String, String>>,
        zipball_bytes: Mutex<Vec<u8>>,
        zipball_mode: Mutex<ZipballMode>,
        remote_mode: Mutex<RemoteMode>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeHost {
        fn new() -> Self {
            Self {
                listings: Mutex::new(HashMap::new()),
                files: Mutex::new(HashMap::new()),
                zipball_bytes: Mutex::new(Vec::new()),
                zipball_mode: Mutex::new(ZipballMode::Ok),
                remote_mode: Mutex::new(RemoteMode::Ok),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_remote_file(self, path: &str, text: &str) -> Self {
            self.listings.lock().unwrap().insert(
                String::new(),
                vec![ContentEntry {
                    name: path.rsplit('/').next().unwrap().to_string(),
                    path: path.to_string(),
                    entry_type: "file".to_string(),
                    size: text.len() as u64,
                }],
            );
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), text.to_string());
            self
        }

        fn with_zip_file(self, entry: &str, text: &str) -> Self {
            let mut cursor = std::io::Cursor::new(Vec::new());
            {
                let mut writer = zip::ZipWriter::new(&mut cursor);
                let options = zip::write::SimpleFileOptions::default();
                writer.start_file(entry, options).unwrap();
                writer.write_all(text.as_bytes()).unwrap();
                writer.finish().unwrap();
            }
            *self.zipball_bytes.lock().unwrap() = cursor.into_inner();
            self
        }

        fn set_zipball_mode(&self, mode: ZipballMode) {
            *self.zipball_mode.lock().unwrap() = mode;
        }

        fn set_remote_mode(&self, mode: RemoteMode) {
            *self.remote_mode.lock().unwrap() = mode;
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, label: &str) -> usize {
            self.calls()
                .iter()
                .filter(|call| call.starts_with(label))
                .count()
        }

        fn remote_error(&self) -> Option<ApiError> {
            match *self.remote_mode.lock().unwrap() {
                RemoteMode::Ok => None,
                RemoteMode::RateLimited => Some(ApiError::RateLimited {
                    repo: "octo/demo".to_string(),
                }),
                RemoteMode::NotFound => Some(ApiError::NotFound {
                    repo: "octo/demo".to_string(),
                    hint: String::new(),
                }),
            }
        }
    }

    #[async_trait]
    impl GitHubHost for FakeHost {
        async fn repository(&self, _repo: &RepoId) -> ApiResult<RepositoryInfo> {
            self.calls.lock().unwrap().push("repository".to_string());
            Ok(RepositoryInfo {
                default_branch: "main".to_string(),
                private: false,
            })
        }

        async fn branch_head(&self, _repo: &RepoId, _branch: &str) -> ApiResult<String> {
            self.calls.lock().unwrap().push("branch_head".to_string());
            Ok("abc123".to_string())
        }

        async fn contents(
            &self,
            _repo: &RepoId,
            path: &str,
            _reference: &str,
        ) -> ApiResult<ContentsResponse> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("contents:{}", path));
            if let Some(err) = self.remote_error() {
                return Err(err);
            }
            if let Some(entries) = self.listings.lock().unwrap().get(path) {
                return Ok(ContentsResponse::Listing(entries.clone()));
            }
            if let Some(text) = self.files.lock().unwrap().get(path) {
                return Ok(ContentsResponse::File(ContentFile {
                    path: path.to_string(),
                    size: text.len() as u64,
                    content: STANDARD.encode(text.as_bytes()),
                    encoding: "base64".to_string(),
                }));
            }
            Err(ApiError::NotFound {
                repo: "octo/demo".to_string(),
                hint: String::new(),
            })
        }

        async fn download_zipball(
            &self,
            _repo: &RepoId,
            _branch: &str,
            dest: &Path,
        ) -> ApiResult<()> {
            self.calls.lock().unwrap().push("zipball".to_string());
            match *self.zipball_mode.lock().unwrap() {
                ZipballMode::Ok => {
                    std::fs::write(dest, self.zipball_bytes.lock().unwrap().clone())?;
                    Ok(())
                }
                ZipballMode::Garbage => {
                    std::fs::write(dest, b"<html>oops</html>")?;
                    Ok(())
                }
                ZipballMode::Fail => Err(ApiError::Status {
                    status: 500,
                    url: "zipball".to_string(),
                }),
            }
        }
    }

    struct Fixture {
        host: Arc<FakeHost>,
        orchestrator: Orchestrator,
        clock: MockTimeProvider,
        _cache_dir: tempfile::TempDir,
    }

    fn fixture(host: FakeHost, options: OrchestratorOptions) -> Fixture {
        let cache_dir = tempfile::tempdir().unwrap();
        let clock = MockTimeProvider::new();
        let host = Arc::new(host);
        let orchestrator = Orchestrator::new(
            host.clone(),
            cache_dir.path().to_path_buf(),
            Arc::new(clock.clone()),
            options,
        );
        Fixture {
            host,
            orchestrator,
            clock,
            _cache_dir: cache_dir,
        }
    }

    fn request(force_api: bool) -> QueryRequest {
        QueryRequest {
            repo: "octo/demo".to_string(),
            keywords: vec!["TODO".to_string()],
            force_api,
        }
    }

    #[tokio::test]
    async fn test_invalid_repo_fails_before_any_network_call() {
        let mut fx = fixture(FakeHost::new(), OrchestratorOptions::default());
        let bad = QueryRequest {
            repo: "not-a-repo".to_string(),
            keywords: vec!["TODO".to_string()],
            force_api: false,
        };

        let err = fx.orchestrator.run(&bad).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidRepo(_)));
        assert!(fx.host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_keywords_fail_before_any_network_call() {
        let mut fx = fixture(FakeHost::new(), OrchestratorOptions::default());
        let bad = QueryRequest {
            repo: "octo/demo".to_string(),
            keywords: vec!["  ".to_string()],
            force_api: false,
        };

        let err = fx.orchestrator.run(&bad).await.unwrap_err();
        assert!(matches!(err, QueryError::NoKeywords));
        assert!(fx.host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_default_path_scans_local_snapshot_with_substring_policy() {
        // "todo fix parser" has no colon, so only the local policy matches it.
        let host = FakeHost::new().with_zip_file("demo-abc/src/a.py", "todo fix parser\n");
        let mut fx = fixture(host, OrchestratorOptions::default());

        let matches = fx.orchestrator.run(&request(false)).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].file_path, "src/a.py");
        assert_eq!(
            matches[0].source_url,
            "https://github.com/octo/demo/blob/main/src/a.py#L1"
        );
        assert_eq!(fx.host.count("zipball"), 1);
        assert_eq!(fx.host.count("contents"), 0);
    }

    #[tokio::test]
    async fn test_cached_result_skips_second_acquisition() {
        let host = FakeHost::new().with_zip_file("demo-abc/a.txt", "TODO: cached\n");
        let mut fx = fixture(host, OrchestratorOptions::default());

        let first = fx.orchestrator.run(&request(false)).await.unwrap();
        let calls_after_first = fx.host.calls().len();
        let second = fx.orchestrator.run(&request(false)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fx.host.calls().len(), calls_after_first);
    }

    #[tokio::test]
    async fn test_expired_cache_triggers_exactly_one_refetch() {
        let host = FakeHost::new().with_zip_file("demo-abc/a.txt", "TODO: cached\n");
        let mut fx = fixture(host, OrchestratorOptions::default());

        fx.orchestrator.run(&request(false)).await.unwrap();
        fx.clock.advance(Duration::from_secs(31 * 60));
        fx.orchestrator.run(&request(false)).await.unwrap();
        fx.orchestrator.run(&request(false)).await.unwrap();

        // Two acquisitions total: the original and one refetch after expiry.
        assert_eq!(fx.host.count("repository"), 2);
    }

    #[tokio::test]
    async fn test_unchanged_commit_reuses_snapshot_after_cache_expiry() {
        let host = FakeHost::new().with_zip_file("demo-abc/a.txt", "TODO: stable\n");
        let mut fx = fixture(host, OrchestratorOptions::default());

        fx.orchestrator.run(&request(false)).await.unwrap();
        fx.clock.advance(Duration::from_secs(31 * 60));
        fx.orchestrator.run(&request(false)).await.unwrap();

        // The result cache expired but the snapshot record is still valid:
        // metadata is re-checked, the archive is not downloaded again.
        assert_eq!(fx.host.count("repository"), 2);
        assert_eq!(fx.host.count("zipball"), 1);
    }

    #[tokio::test]
    async fn test_local_failure_falls_back_to_remote() {
        let host = FakeHost::new().with_remote_file("src/a.py", "# TODO: fix parser\nreturn None\n");
        host.set_zipball_mode(ZipballMode::Fail);
        let mut fx = fixture(host, OrchestratorOptions::default());

        let matches = fx.orchestrator.run(&request(false)).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].snippet, "# TODO: fix parser\nreturn None");
        let calls = fx.host.calls();
        let zipball_pos = calls.iter().position(|c| c == "zipball").unwrap();
        let contents_pos = calls.iter().position(|c| c.starts_with("contents")).unwrap();
        assert!(zipball_pos < contents_pos, "local path must run first");
    }

    #[tokio::test]
    async fn test_corrupt_archive_falls_back_to_remote() {
        let host = FakeHost::new().with_remote_file("a.py", "# TODO: remote\n");
        host.set_zipball_mode(ZipballMode::Garbage);
        let mut fx = fixture(host, OrchestratorOptions::default());

        let matches = fx.orchestrator.run(&request(false)).await.unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_on_fallback_sets_sentinel_and_blocks_remote() {
        let host = FakeHost::new();
        host.set_zipball_mode(ZipballMode::Fail);
        host.set_remote_mode(RemoteMode::RateLimited);
        let mut fx = fixture(host, OrchestratorOptions::default());

        let err = fx.orchestrator.run(&request(false)).await.unwrap_err();
        assert!(err.is_rate_limited());
        let remote_attempts = fx.host.count("contents");

        // Second run: remote is sentinel-blocked, local still failing, so the
        // rate limit is re-raised without another API attempt.
        let err = fx.orchestrator.run(&request(false)).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(fx.host.count("contents"), remote_attempts);
    }

    #[tokio::test]
    async fn test_force_api_skips_local_on_success() {
        let host = FakeHost::new().with_remote_file("a.py", "# TODO: remote\n");
        let mut fx = fixture(host, OrchestratorOptions::default());

        let matches = fx.orchestrator.run(&request(true)).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(fx.host.count("zipball"), 0);
    }

    #[tokio::test]
    async fn test_force_api_rate_limit_attempts_local_before_failing() {
        let host = FakeHost::new().with_zip_file("demo-abc/a.py", "todo local rescue\n");
        host.set_remote_mode(RemoteMode::RateLimited);
        let mut fx = fixture(host, OrchestratorOptions::default());

        let matches = fx.orchestrator.run(&request(true)).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].snippet, "todo local rescue");
        assert_eq!(fx.host.count("zipball"), 1);
    }

    #[tokio::test]
    async fn test_force_api_non_rate_limit_error_surfaces_directly() {
        let host = FakeHost::new();
        host.set_remote_mode(RemoteMode::NotFound);
        let mut fx = fixture(host, OrchestratorOptions::default());

        let err = fx.orchestrator.run(&request(true)).await.unwrap_err();
        assert!(matches!(err, QueryError::Api(ApiError::NotFound { .. })));
        assert_eq!(fx.host.count("zipball"), 0);
    }

    #[tokio::test]
    async fn test_cache_disabled_always_reacquires() {
        let host = FakeHost::new().with_zip_file("demo-abc/a.txt", "TODO: uncached\n");
        let options = OrchestratorOptions {
            cache_enabled: false,
            ..OrchestratorOptions::default()
        };
        let mut fx = fixture(host, options);

        fx.orchestrator.run(&request(false)).await.unwrap();
        fx.orchestrator.run(&request(false)).await.unwrap();

        assert_eq!(fx.host.count("repository"), 2);
    }
}
