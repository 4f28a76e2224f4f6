//! reqwest-backed implementation of the hosting-service boundary

use super::error::{ApiError, ApiResult};
use super::types::{BranchInfo, ContentsResponse, RepositoryInfo};
use super::GitHubHost;
use crate::core::validation::RepoId;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use reqwest::header;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::io::AsyncWriteExt;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("repotags/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the hosting service
///
/// Two underlying clients: one for JSON API calls (transport-level redirect
/// handling is fine there) and one for archive downloads with auto-redirect
/// disabled, so the single permitted redirect hop is handled explicitly.
pub struct GitHubClient {
    api: reqwest::Client,
    download: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> ApiResult<Self> {
        Self::with_base_url(DEFAULT_API_BASE, token)
    }

    /// Client against an alternate base URL (mock servers in tests).
    pub fn with_base_url(api_base: impl Into<String>, token: Option<String>) -> ApiResult<Self> {
        let api = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let download = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            api,
            download,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    fn contents_url(&self, repo: &RepoId, path: &str, reference: &str) -> String {
        if path.is_empty() {
            format!(
                "{}/repos/{}/{}/contents?ref={}",
                self.api_base,
                repo.owner(),
                repo.name(),
                reference
            )
        } else {
            format!(
                "{}/repos/{}/{}/contents/{}?ref={}",
                self.api_base,
                repo.owner(),
                repo.name(),
                path,
                reference
            )
        }
    }

    fn status_error(&self, status: StatusCode, repo: &RepoId, url: &str) -> ApiError {
        match status.as_u16() {
            404 => {
                let hint = if self.token.is_none() {
                    " (private repositories require a configured access token)".to_string()
                } else {
                    String::new()
                };
                ApiError::NotFound {
                    repo: repo.to_string(),
                    hint,
                }
            }
            403 | 429 => ApiError::RateLimited {
                repo: repo.to_string(),
            },
            code => ApiError::Status {
                status: code,
                url: url.to_string(),
            },
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, repo: &RepoId) -> ApiResult<T> {
        log::debug!("GET {}", url);
        let response = self
            .authorize(self.api.get(url).header(header::ACCEPT, ACCEPT_JSON))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, repo, url));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{} ({})", e, url)))
    }

    /// Stream `url` to `dest`. The one redirect hop delegates back into this
    /// same routine with redirects disallowed; any failure after the file is
    /// created removes the partial download.
    fn download_to<'a>(
        &'a self,
        url: String,
        repo: &'a RepoId,
        dest: &'a Path,
        follow_redirect: bool,
    ) -> BoxFuture<'a, ApiResult<()>> {
        async move {
            log::debug!("GET {} -> {}", url, dest.display());
            let response = self.authorize(self.download.get(&url)).send().await?;
            let status = response.status();

            if status.is_redirection() {
                if !follow_redirect {
                    return Err(ApiError::Status {
                        status: status.as_u16(),
                        url,
                    });
                }
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        ApiError::Decode(format!("redirect without Location header from {}", url))
                    })?;
                return self.download_to(location, repo, dest, false).await;
            }

            if !status.is_success() {
                return Err(self.status_error(status, repo, &url));
            }

            let mut file = tokio::fs::File::create(dest).await?;
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let result = match chunk {
                    Ok(bytes) => file.write_all(&bytes).await.map_err(ApiError::from),
                    Err(e) => Err(ApiError::from(e)),
                };
                if let Err(e) = result {
                    drop(file);
                    let _ = tokio::fs::remove_file(dest).await;
                    return Err(e);
                }
            }
            if let Err(e) = file.flush().await {
                drop(file);
                let _ = tokio::fs::remove_file(dest).await;
                return Err(e.into());
            }

            Ok(())
        }
        .boxed()
    }
}

#[async_trait]
impl GitHubHost for GitHubClient {
    async fn repository(&self, repo: &RepoId) -> ApiResult<RepositoryInfo> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner(), repo.name());
        self.get_json(&url, repo).await
    }

    async fn branch_head(&self, repo: &RepoId, branch: &str) -> ApiResult<String> {
        let url = format!(
            "{}/repos/{}/{}/branches/{}",
            self.api_base,
            repo.owner(),
            repo.name(),
            branch
        );
        let info: BranchInfo = self.get_json(&url, repo).await?;
        Ok(info.commit.sha)
    }

    async fn contents(
        &self,
        repo: &RepoId,
        path: &str,
        reference: &str,
    ) -> ApiResult<ContentsResponse> {
        let url = self.contents_url(repo, path, reference);
        self.get_json(&url, repo).await
    }

    async fn download_zipball(&self, repo: &RepoId, branch: &str, dest: &Path) -> ApiResult<()> {
        let url = format!(
            "{}/repos/{}/{}/zipball/{}",
            self.api_base,
            repo.owner(),
            repo.name(),
            branch
        );
        self.download_to(url, repo, dest, true).await
    }
}
