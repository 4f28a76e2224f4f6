//! Keyword matching
//!
//! The `Match` type plus the two line-matching policies in use: annotation
//! matching (literal `KEYWORD:` substring, used against API-fetched content)
//! and bare substring matching (case-insensitive, used against extracted
//! snapshots). The divergence is part of the observable contract; do not
//! unify the policies.

mod set;
mod types;

pub use set::{KeywordSet, MatchPolicy};
pub use types::Match;

/// Scan text line by line, emitting one `Match` per hit.
///
/// Under `MatchPolicy::Annotation` a line can produce one match per keyword;
/// under `MatchPolicy::Substring` a line produces at most one match (first
/// keyword wins). The snippet is the trimmed matching line joined with the
/// trimmed following line when one exists.
pub fn scan_text<F>(
    text: &str,
    keywords: &KeywordSet,
    policy: MatchPolicy,
    file_path: &str,
    mut link: F,
) -> Vec<Match>
where
    F: FnMut(u32) -> String,
{
    let lines: Vec<&str> = text.lines().collect();
    let mut matches = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let line_number = (index + 1) as u32;
        let hits = match policy {
            MatchPolicy::Annotation => keywords.annotation_hits(line),
            MatchPolicy::Substring => keywords
                .first_substring_hit(line)
                .map(|k| vec![k])
                .unwrap_or_default(),
        };

        for _keyword in hits {
            matches.push(Match {
                file_path: file_path.to_string(),
                line_number,
                snippet: build_snippet(&lines, index),
                source_url: link(line_number),
            });
        }
    }

    matches
}

fn build_snippet(lines: &[&str], index: usize) -> String {
    let mut snippet = lines[index].trim().to_string();
    if let Some(next) = lines.get(index + 1) {
        snippet.push('\n');
        snippet.push_str(next.trim());
    }
    snippet
}
