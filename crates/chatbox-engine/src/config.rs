//! Configuration types for chatbox.
//!
//! The config file is optional JSON; every field has a default so a
//! partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default endpoint the chat backend listens on.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Main configuration for chatbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Scheme, host and port of the chat backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Percent-encode the message in the query string.
    ///
    /// Off by default: the message is appended to the URL as typed.
    #[serde(default)]
    pub encode_query: bool,

    /// Ignore submissions while an exchange is still pending.
    #[serde(default)]
    pub block_while_pending: bool,

    /// UI tick rate in milliseconds.
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_tick_rate_ms() -> u64 {
    250
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            encode_query: false,
            block_while_pending: false,
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(!config.encode_query);
        assert!(!config.block_while_pending);
        assert_eq!(config.tick_rate_ms, 250);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = serde_json::from_str(r#"{"encode_query": true}"#).unwrap();
        assert!(parsed.encode_query);
        assert_eq!(parsed.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            base_url: "http://127.0.0.1:9000".into(),
            block_while_pending: true,
            ..Default::default()
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
