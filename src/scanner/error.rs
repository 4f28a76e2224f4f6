//! Scanner error types

use crate::core::error_handling::ContextualError;

/// Errors from the local filesystem scan
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("snapshot directory '{path}' is not readable: {source}")]
    Root {
        path: String,
        source: std::io::Error,
    },

    #[error("io error while scanning: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScanResult<T> = Result<T, ScanError>;

impl ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<String> {
        None
    }
}
