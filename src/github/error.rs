//! API error taxonomy

use crate::core::error_handling::ContextualError;

/// Errors from the hosting service collaborator
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Repository missing or not visible to the caller
    #[error("repository '{repo}' was not found or is not accessible{hint}")]
    NotFound { repo: String, hint: String },

    /// API quota exhausted
    #[error("API rate limit exhausted for '{repo}'")]
    RateLimited { repo: String },

    /// Any other non-success HTTP status
    #[error("unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// Transport failure, surfaced verbatim
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("malformed API response: {0}")]
    Decode(String),

    /// Local IO failure while persisting a download
    #[error("io error during download: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

impl ContextualError for ApiError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ApiError::NotFound { .. } => true,
            ApiError::RateLimited { .. } => true,
            ApiError::Status { .. } => false,
            ApiError::Network(_) => false,
            ApiError::Decode(_) => false,
            ApiError::Io(_) => false,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            ApiError::NotFound { .. } | ApiError::RateLimited { .. } => Some(self.to_string()),
            _ => None,
        }
    }
}
