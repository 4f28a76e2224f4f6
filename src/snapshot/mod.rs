//! Archive acquisition
//!
//! Keeps a local extracted snapshot of a repository's default branch. The
//! branch head commit is compared against the recorded snapshot to skip
//! redundant downloads; otherwise the zipball is streamed to disk, its
//! signature validated, and its entries extracted into a per-snapshot
//! directory under the cache dir.

pub mod archive;
mod error;
mod manager;

pub use error::{ArchiveErrorKind, SnapshotError, SnapshotResult};
pub use manager::{LocalSnapshot, SnapshotManager, SnapshotRecord};
