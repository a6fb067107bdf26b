//! CLI configuration with TOML file support.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pyre_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// An opening balance handed to the local bank on first run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningBalance {
    pub credit: String,
    pub account: String,
    pub amount: u128,
}

/// Configuration for the `pyre` tool.
///
/// Ids anywhere in the file are 64 hex characters or a label, which is
/// hashed into an id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory holding the snapshot, meta and event log.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Account that receives burned funds. Defaults to the zero account.
    #[serde(default)]
    pub burn_sink: Option<String>,

    /// Balances seeded into the local bank the first time the data
    /// directory is used.
    #[serde(default)]
    pub balances: Vec<OpeningBalance>,

    /// Item -> parent item. Items without an entry are their own root.
    #[serde(default)]
    pub item_parents: BTreeMap<String, String>,

    /// Item -> governing credit type.
    #[serde(default)]
    pub item_tokens: BTreeMap<String, String>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./pyre_data")
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            burn_sink: None,
            balances: Vec::new(),
            item_parents: BTreeMap::new(),
            item_tokens: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = CliConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.data_dir, PathBuf::from("./pyre_data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(config.balances.is_empty());
    }

    #[test]
    fn full_toml_parses() {
        let toml = r#"
            data_dir = "/tmp/pyre"
            log_format = "json"
            burn_sink = "furnace"

            [[balances]]
            credit = "cred"
            account = "alice"
            amount = 1000

            [item_parents]
            reply = "post"

            [item_tokens]
            post = "cred"
        "#;
        let config = CliConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pyre"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.burn_sink.as_deref(), Some("furnace"));
        assert_eq!(
            config.balances,
            vec![OpeningBalance {
                credit: "cred".into(),
                account: "alice".into(),
                amount: 1000,
            }]
        );
        assert_eq!(config.item_parents.get("reply").map(String::as_str), Some("post"));
        assert_eq!(config.item_tokens.get("post").map(String::as_str), Some("cred"));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = CliConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = CliConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.log_level, config.log_level);
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = CliConfig::from_toml_file(Path::new("/nonexistent/pyre.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn unknown_log_format_is_parse_error() {
        let result = CliConfig::from_toml_str("log_format = \"xml\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
