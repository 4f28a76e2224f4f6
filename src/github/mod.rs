//! GitHub API collaborator
//!
//! Everything that talks to the hosting service lives behind the
//! [`GitHubHost`] trait: repository metadata, branch heads, the recursive
//! contents listing, per-file content retrieval and zipball download. The
//! reqwest-backed [`GitHubClient`] is the production implementation; tests
//! substitute fakes or point the base URL at a local mock server.

mod client;
pub mod error;
pub mod types;

pub use client::GitHubClient;
pub use error::{ApiError, ApiResult};
pub use types::{ContentEntry, ContentFile, ContentsResponse, RepositoryInfo};

use crate::core::validation::RepoId;
use async_trait::async_trait;
use std::path::Path;

/// Boundary trait for the hosting service
#[async_trait]
pub trait GitHubHost: Send + Sync {
    /// Repository metadata; the default branch name in particular.
    async fn repository(&self, repo: &RepoId) -> ApiResult<RepositoryInfo>;

    /// Commit id at the head of the named branch.
    async fn branch_head(&self, repo: &RepoId, branch: &str) -> ApiResult<String>;

    /// List a directory or fetch a single file at `path` on `reference`.
    async fn contents(
        &self,
        repo: &RepoId,
        path: &str,
        reference: &str,
    ) -> ApiResult<ContentsResponse>;

    /// Download the zipball of `branch` to `dest`, deleting any partial file
    /// on failure.
    async fn download_zipball(&self, repo: &RepoId, branch: &str, dest: &Path) -> ApiResult<()>;
}
