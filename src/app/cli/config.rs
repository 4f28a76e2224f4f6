//! TOML configuration file parsing and loading
//!
//! Settings come from three layers: built-in defaults, the configuration
//! file (`repotags.toml` under the platform config directory unless a path
//! is given), and CLI arguments, with later layers winning.

use super::args::{parse_comma_separated, Args};
use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

const CONFIG_DIR_NAME: &str = "repotags";
const CONFIG_FILE_NAME: &str = "repotags.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the specified configuration file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("error reading configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error parsing configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("configuration error: {0}")]
    Invalid(String),
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Effective settings after defaults, file and CLI merging
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: Option<String>,
    pub keywords: Vec<String>,
    pub cache_enabled: bool,
    pub cache_expiry_minutes: u64,
    pub cache_dir: PathBuf,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: None,
            keywords: vec!["TODO".to_string(), "FIXME".to_string()],
            cache_enabled: true,
            cache_expiry_minutes: 30,
            cache_dir: default_cache_dir(),
            log_level: None,
            log_format: None,
            log_file: None,
            color: None,
        }
    }
}

impl Settings {
    /// Load the configuration file (if any) and apply CLI overrides.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();

        if let Some(path) = resolve_config_path(args)? {
            let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                path: path.clone(),
                source: e,
            })?;
            let table: toml::Table =
                toml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
            settings.apply_toml_values(&table)?;
        }

        settings.apply_cli_overrides(args);
        Ok(settings)
    }

    fn apply_toml_values(&mut self, config: &toml::Table) -> Result<(), ConfigError> {
        if let Some(value) = config.get("token").and_then(|v| v.as_str()) {
            if !value.trim().is_empty() {
                self.token = Some(value.to_string());
            }
        }

        if let Some(value) = config.get("keywords") {
            let mut raw = Vec::new();
            if let Some(single) = value.as_str() {
                raw.push(single.to_string());
            } else if let Some(array) = value.as_array() {
                for item in array {
                    if let Some(s) = item.as_str() {
                        raw.push(s.to_string());
                    }
                }
            }
            let parsed = parse_comma_separated(&raw);
            if !parsed.is_empty() {
                self.keywords = parsed;
            }
        }

        if let Some(value) = config.get("cache-enabled").and_then(|v| v.as_bool()) {
            self.cache_enabled = value;
        }

        if let Some(value) = config.get("cache-expiry-minutes") {
            let minutes = value
                .as_integer()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::Invalid(
                        "cache-expiry-minutes must be a positive integer".to_string(),
                    )
                })?;
            self.cache_expiry_minutes = minutes as u64;
        }

        if let Some(value) = config.get("cache-dir").and_then(|v| v.as_str()) {
            self.cache_dir = PathBuf::from(value);
        }

        if let Some(value) = config.get("log-level").and_then(|v| v.as_str()) {
            self.log_level = Some(value.to_string());
        }
        if let Some(value) = config.get("log-format").and_then(|v| v.as_str()) {
            self.log_format = Some(value.to_string());
        }
        if let Some(value) = config.get("log-file").and_then(|v| v.as_str()) {
            self.log_file = Some(PathBuf::from(value));
        }
        if let Some(value) = config.get("color").and_then(|v| v.as_bool()) {
            self.color = Some(value);
        }

        Ok(())
    }

    fn apply_cli_overrides(&mut self, args: &Args) {
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if args.no_cache {
            self.cache_enabled = false;
        }
        if let Some(minutes) = args.cache_expiry {
            self.cache_expiry_minutes = minutes;
        }
        if let Some(dir) = &args.cache_dir {
            self.cache_dir = dir.clone();
        }
        if let Some(level) = &args.log_level {
            self.log_level = Some(level.clone());
        }
        if let Some(format) = &args.log_format {
            self.log_format = Some(format.clone());
        }
        if let Some(file) = &args.log_file {
            self.log_file = Some(file.clone());
        }
        if args.no_color {
            self.color = Some(false);
        } else if args.color {
            self.color = Some(true);
        }
    }
}

fn resolve_config_path(args: &Args) -> Result<Option<PathBuf>, ConfigError> {
    match &args.config_file {
        Some(path) => {
            // User specified a config file - it must exist
            if !path.exists() {
                return Err(ConfigError::NotFound(path.clone()));
            }
            Ok(Some(path.clone()))
        }
        None => {
            let default_path =
                dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
            match default_path {
                Some(path) if path.exists() => Ok(Some(path)),
                _ => Ok(None),
            }
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join(CONFIG_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(CONFIG_DIR_NAME))
}
