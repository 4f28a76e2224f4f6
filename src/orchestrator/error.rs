//! Query error surface

use crate::core::error_handling::ContextualError;
use crate::core::validation::RepoIdError;
use crate::github::ApiError;

/// Errors surfaced to the caller after the fallback chain is exhausted
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    InvalidRepo(#[from] RepoIdError),

    #[error("no keywords configured; pass --keyword or set defaults in the config file")]
    NoKeywords,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, QueryError::Api(api) if api.is_rate_limited())
    }
}

impl ContextualError for QueryError {
    fn is_user_actionable(&self) -> bool {
        match self {
            QueryError::InvalidRepo(_) => true,
            QueryError::NoKeywords => true,
            QueryError::Api(api) => api.is_user_actionable(),
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            QueryError::InvalidRepo(e) => Some(e.to_string()),
            QueryError::NoKeywords => Some(self.to_string()),
            QueryError::Api(api) => api.user_message(),
        }
    }
}
