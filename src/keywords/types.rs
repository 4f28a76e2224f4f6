//! Match data type

/// One reported keyword occurrence with location and context
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Match {
    /// Repository-relative file path
    pub file_path: String,
    /// 1-based line number of the matching line
    pub line_number: u32,
    /// Trimmed matching line joined with the trimmed following line
    pub snippet: String,
    /// Deep link to the matching line on the hosting site
    pub source_url: String,
}
