//! Snapshot error types

use crate::core::error_handling::ContextualError;
use crate::github::ApiError;
use std::fmt;

/// Classification of archive validation/extraction failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveErrorKind {
    /// First four bytes are not the zip signature
    Signature,
    /// Corrupted central directory table
    CentralDirectory,
    /// Corrupted entry header
    EntryHeader,
    /// Anything else the extractor reports
    Other,
}

impl fmt::Display for ArchiveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArchiveErrorKind::Signature => "bad signature",
            ArchiveErrorKind::CentralDirectory => "corrupted directory table",
            ArchiveErrorKind::EntryHeader => "corrupted entry header",
            ArchiveErrorKind::Other => "extraction failure",
        };
        write!(f, "{}", label)
    }
}

/// Errors from archive acquisition
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Metadata fetch or download failure, propagated from the API collaborator
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The downloaded file is not a usable archive
    #[error("invalid archive ({kind}): {message}")]
    InvalidArchive {
        kind: ArchiveErrorKind,
        message: String,
    },

    /// Local filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

impl ContextualError for SnapshotError {
    fn is_user_actionable(&self) -> bool {
        match self {
            SnapshotError::Api(api) => api.is_user_actionable(),
            SnapshotError::InvalidArchive { .. } => false,
            SnapshotError::Io(_) => false,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            SnapshotError::Api(api) => api.user_message(),
            _ => None,
        }
    }
}
