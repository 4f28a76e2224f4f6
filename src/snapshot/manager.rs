//! Snapshot lifecycle manager

use super::archive;
use super::error::SnapshotResult;
use crate::core::time::TimeProvider;
use crate::core::validation::RepoId;
use crate::github::GitHubHost;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

/// Bookkeeping for one repository's local snapshot
#[derive(Debug, Clone)]
pub struct SnapshotRecord {
    pub repo_id: String,
    pub last_known_commit: String,
    pub archive_path: PathBuf,
    pub extracted_path: PathBuf,
    pub fetched_at: SystemTime,
}

/// An up-to-date extracted snapshot ready for scanning
#[derive(Debug, Clone)]
pub struct LocalSnapshot {
    pub root: PathBuf,
    pub branch: String,
    pub commit: String,
    /// false when the existing extraction was reused without a download
    pub refreshed: bool,
}

/// Downloads and extracts repository snapshots under a cache directory,
/// keeping one record per repository so unchanged heads skip the download.
pub struct SnapshotManager {
    host: Arc<dyn GitHubHost>,
    cache_dir: PathBuf,
    time: Arc<dyn TimeProvider>,
    records: HashMap<String, SnapshotRecord>,
}

impl SnapshotManager {
    pub fn new(host: Arc<dyn GitHubHost>, cache_dir: PathBuf, time: Arc<dyn TimeProvider>) -> Self {
        Self {
            host,
            cache_dir,
            time,
            records: HashMap::new(),
        }
    }

    /// Return a trusted extracted snapshot of the default branch, downloading
    /// only when the branch head moved since the recorded snapshot.
    pub async fn ensure_local_snapshot(&mut self, repo: &RepoId) -> SnapshotResult<LocalSnapshot> {
        let info = self.host.repository(repo).await?;
        let branch = info.default_branch;
        let commit = self.host.branch_head(repo, &branch).await?;

        if let Some(record) = self.records.get(&repo.to_string()) {
            if record.last_known_commit == commit && record.extracted_path.is_dir() {
                log::debug!("snapshot of {} at {} is current, skipping download", repo, commit);
                return Ok(LocalSnapshot {
                    root: record.extracted_path.clone(),
                    branch,
                    commit,
                    refreshed: false,
                });
            }
        }

        let repo_dir = self.cache_dir.join(repo.cache_component());
        fs::create_dir_all(&repo_dir)?;
        let archive_path = repo_dir.join("snapshot.zip");
        let extracted_path = repo_dir.join(format!("tree-{}", short_commit(&commit)));

        log::info!("downloading snapshot of {} at {}", repo, commit);
        self.host
            .download_zipball(repo, &branch, &archive_path)
            .await?;
        archive::validate_signature(&archive_path)?;

        if extracted_path.exists() {
            fs::remove_dir_all(&extracted_path)?;
        }
        fs::create_dir_all(&extracted_path)?;
        if let Err(e) = archive::extract(&archive_path, &extracted_path) {
            // Leave nothing half-written behind a failed extraction.
            let _ = fs::remove_dir_all(&extracted_path);
            let _ = fs::remove_file(&archive_path);
            return Err(e);
        }

        self.records.insert(
            repo.to_string(),
            SnapshotRecord {
                repo_id: repo.to_string(),
                last_known_commit: commit.clone(),
                archive_path,
                extracted_path: extracted_path.clone(),
                fetched_at: self.time.system_time(),
            },
        );

        Ok(LocalSnapshot {
            root: extracted_path,
            branch,
            commit,
            refreshed: true,
        })
    }

    pub fn record(&self, repo: &RepoId) -> Option<&SnapshotRecord> {
        self.records.get(&repo.to_string())
    }
}

fn short_commit(commit: &str) -> &str {
    let end = commit.len().min(12);
    &commit[..end]
}
