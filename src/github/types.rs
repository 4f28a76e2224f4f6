//! API response types
//!
//! Shapes mirror the REST payloads this tool consumes. The contents endpoint
//! returns either an array (directory listing) or a single object (file);
//! [`ContentsResponse`] captures that as a tagged variant resolved once at the
//! call site instead of dynamic shape checks sprinkled through the fetch path.

use super::error::{ApiError, ApiResult};
use serde::Deserialize;

/// Repository metadata subset
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    pub default_branch: String,
    #[serde(default)]
    pub private: bool,
}

/// Branch metadata subset
#[derive(Debug, Clone, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub commit: BranchCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
}

/// One entry of a directory listing
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub size: u64,
}

impl ContentEntry {
    pub fn is_dir(&self) -> bool {
        self.entry_type == "dir"
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }
}

/// A single file payload with transport-encoded content
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub path: String,
    #[serde(default)]
    pub size: u64,
    pub content: String,
    pub encoding: String,
}

impl ContentFile {
    /// Decode the transport encoding into text.
    ///
    /// The API interleaves the base64 payload with newlines; strip all
    /// whitespace before decoding. Undecodable bytes are replaced rather than
    /// failing the whole file.
    pub fn decoded_text(&self) -> ApiResult<String> {
        if self.encoding != "base64" {
            return Err(ApiError::Decode(format!(
                "unsupported content encoding '{}' for {}",
                self.encoding, self.path
            )));
        }

        use base64::engine::general_purpose::STANDARD;
        use base64::Engine as _;

        let compact: String = self.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ApiError::Decode(format!("invalid base64 for {}: {}", self.path, e)))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Directory listing or single file, depending on the requested path
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentsResponse {
    Listing(Vec<ContentEntry>),
    File(ContentFile),
}
