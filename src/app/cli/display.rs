//! Terminal rendering of match results

use crate::keywords::Match;
use colored::Colorize;

/// Render matches as human-readable text.
pub fn render_text(matches: &[Match], use_color: bool) -> String {
    let mut out = String::new();

    if matches.is_empty() {
        out.push_str("No matches found.\n");
        return out;
    }

    let heading = format!(
        "{} match{} found",
        matches.len(),
        if matches.len() == 1 { "" } else { "es" }
    );
    if use_color {
        out.push_str(&heading.bold().to_string());
    } else {
        out.push_str(&heading);
    }
    out.push('\n');

    for m in matches {
        let location = format!("{}:{}", m.file_path, m.line_number);
        if use_color {
            out.push_str(&format!("\n{}\n", location.cyan()));
        } else {
            out.push_str(&format!("\n{}\n", location));
        }
        for line in m.snippet.lines() {
            out.push_str(&format!("    {}\n", line));
        }
        if use_color {
            out.push_str(&format!("    {}\n", m.source_url.dimmed()));
        } else {
            out.push_str(&format!("    {}\n", m.source_url));
        }
    }

    out
}

/// Render matches as pretty-printed JSON.
pub fn render_json(matches: &[Match]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(matches)
}
