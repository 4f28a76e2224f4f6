//! Core CLI arguments structure
//!
//! Query inputs can come from flags or from a query block file; precedence
//! and merging with the configuration file happen in `config` and `startup`.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "repotags")]
#[command(about = "Fetch keyword-tagged lines (TODO/FIXME) from a hosted repository")]
#[command(version)]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Repository to query
    #[arg(short = 'r', long = "repo", value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Keywords to search for*
    #[arg(short = 'k', long = "keyword", value_name = "WORDS", action = ArgAction::Append)]
    pub keywords: Vec<String>,

    /// Skip the local snapshot path and fetch file-by-file over the API
    #[arg(long = "force-api")]
    pub force_api: bool,

    /// Read a query block from FILE ('-' for stdin)
    #[arg(short = 'b', long = "block", value_name = "FILE")]
    pub block: Option<String>,

    /// Access token for private repositories and higher rate limits
    #[arg(long = "token", value_name = "TOKEN")]
    pub token: Option<String>,

    /// Disable result caching for this invocation
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Result cache expiry in minutes
    #[arg(long = "cache-expiry", value_name = "MINUTES", value_parser = parse_positive_u64)]
    pub cache_expiry: Option<u64>,

    /// Snapshot/cache directory override
    #[arg(long = "cache-dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "json"])]
    pub log_format: Option<String>,

    /// Log file path
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Result output format
    #[arg(short = 'o', long = "output", value_name = "FORMAT", value_parser = ["text", "json"], default_value = "text")]
    pub output: String,

    /// Force color output
    #[arg(long = "color")]
    pub color: bool,

    /// Disable color output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

/// Validate positive integer value
fn parse_positive_u64(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Expand repeated and comma-separated values into one deduplicated list.
pub fn parse_comma_separated(values: &[String]) -> Vec<String> {
    let mut result = Vec::new();
    for value in values {
        for token in value.split(',') {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !result.iter().any(|existing: &String| existing == trimmed) {
                result.push(trimmed.to_string());
            }
        }
    }
    result
}
