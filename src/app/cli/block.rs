//! Query block mini-language
//!
//! Line-oriented `key: value` input as it appears in a fenced note block:
//!
//! ```text
//! repo: octo/demo
//! keywords: TODO FIXME   # trailing comment
//! force-api: true
//! ```
//!
//! `repo:` is required; unknown keys are ignored with a warning.

/// Parsed query block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockQuery {
    pub repo: String,
    pub keywords: Vec<String>,
    pub force_api: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockParseError {
    #[error("query block is missing the required 'repo:' line")]
    MissingRepo,

    #[error("invalid value '{value}' for force-api (expected true or false)")]
    InvalidForceApi { value: String },
}

pub fn parse_block(text: &str) -> Result<BlockQuery, BlockParseError> {
    let mut repo = None;
    let mut keywords = Vec::new();
    let mut force_api = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            log::warn!("ignoring query line without a key: '{}'", line);
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "repo" => repo = Some(value.to_string()),
            "keywords" => {
                // Everything after '#' is a comment.
                let tokens = value.split('#').next().unwrap_or("");
                keywords = tokens.split_whitespace().map(str::to_string).collect();
            }
            "force-api" => match value.to_lowercase().as_str() {
                "true" => force_api = Some(true),
                "false" => force_api = Some(false),
                other => {
                    return Err(BlockParseError::InvalidForceApi {
                        value: other.to_string(),
                    })
                }
            },
            _ => log::warn!("ignoring unknown query key '{}'", key),
        }
    }

    match repo {
        Some(repo) => Ok(BlockQuery {
            repo,
            keywords,
            force_api,
        }),
        None => Err(BlockParseError::MissingRepo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_block() {
        let block = parse_block("repo: octo/demo\nkeywords: TODO FIXME\nforce-api: true\n").unwrap();
        assert_eq!(block.repo, "octo/demo");
        assert_eq!(block.keywords, vec!["TODO", "FIXME"]);
        assert_eq!(block.force_api, Some(true));
    }

    #[test]
    fn test_parse_block_with_fences_and_blank_lines() {
        let text = "```repotags\n\nrepo: octo/demo\n\n```\n";
        let block = parse_block(text).unwrap();
        assert_eq!(block.repo, "octo/demo");
        assert!(block.keywords.is_empty());
        assert_eq!(block.force_api, None);
    }

    #[test]
    fn test_keywords_trailing_comment_is_stripped() {
        let block =
            parse_block("repo: octo/demo\nkeywords: TODO FIXME # only these two\n").unwrap();
        assert_eq!(block.keywords, vec!["TODO", "FIXME"]);
    }

    #[test]
    fn test_missing_repo_is_an_error() {
        assert_eq!(
            parse_block("keywords: TODO\n").unwrap_err(),
            BlockParseError::MissingRepo
        );
    }

    #[test]
    fn test_invalid_force_api_value_is_an_error() {
        let err = parse_block("repo: octo/demo\nforce-api: yes\n").unwrap_err();
        assert_eq!(
            err,
            BlockParseError::InvalidForceApi {
                value: "yes".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let block = parse_block("repo: octo/demo\ntheme: dark\n").unwrap();
        assert_eq!(block.repo, "octo/demo");
    }

    #[test]
    fn test_repo_value_keeps_inner_slash() {
        let block = parse_block("repo: octo/demo").unwrap();
        assert_eq!(block.repo, "octo/demo");
    }
}
