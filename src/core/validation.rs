//! Repository identifier validation
//!
//! Parses `owner/name` identifiers before any network activity so malformed
//! input fails fast with a user-actionable message.

use std::fmt;

/// Malformed repository identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository identifier '{input}' (expected owner/name)")]
pub struct RepoIdError {
    pub input: String,
}

/// A validated `owner/name` repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Parse an identifier of the form `owner/name`.
    ///
    /// Exactly one `/` separating two non-empty segments is accepted;
    /// anything else is rejected without touching the network.
    pub fn parse(input: &str) -> Result<Self, RepoIdError> {
        let trimmed = input.trim();
        let mut segments = trimmed.split('/');

        let owner = segments.next().unwrap_or_default();
        let name = segments.next().unwrap_or_default();

        if owner.is_empty() || name.is_empty() || segments.next().is_some() {
            return Err(RepoIdError {
                input: input.to_string(),
            });
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier usable as a single filesystem path component
    pub fn cache_component(&self) -> String {
        format!("{}-{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
