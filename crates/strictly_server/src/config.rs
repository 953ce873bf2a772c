//! Server configuration loaded from TOML.

use crate::error::ConfigError;
use crate::session::DEFAULT_CHAT_LIMIT;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strictly_baduk::Ruleset;
use tracing::{debug, info, instrument};

/// Settings for the session registry and the binary.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Rules used when a session is created without explicit rules.
    #[serde(default)]
    default_ruleset: Ruleset,

    /// Events buffered per broadcast subscriber.
    #[serde(default = "default_event_capacity")]
    event_capacity: usize,

    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// Lines kept in each session's chat log.
    #[serde(default = "default_chat_limit")]
    chat_limit: usize,
}

#[instrument]
fn default_event_capacity() -> usize {
    256
}

#[instrument]
fn default_log_filter() -> String {
    "strictly_server=info,strictly_baduk=warn".to_string()
}

#[instrument]
fn default_chat_limit() -> usize {
    DEFAULT_CHAT_LIMIT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_ruleset: Ruleset::default(),
            event_capacity: default_event_capacity(),
            log_filter: default_log_filter(),
            chat_limit: default_chat_limit(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            size = %config.default_ruleset.board_size,
            komi = config.default_ruleset.komi,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text and validates the rules.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config
            .default_ruleset
            .validate()
            .map_err(|e| ConfigError::new(format!("Invalid default ruleset: {}", e)))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_baduk::{BoardSize, KoRule, ScoringMethod};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServerConfig::from_toml("").expect("empty is valid");
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.default_ruleset().board_size, BoardSize::Nineteen);
        assert_eq!(*config.chat_limit(), DEFAULT_CHAT_LIMIT);
    }

    #[test]
    fn test_partial_ruleset_fills_in_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            event_capacity = 16

            [default_ruleset]
            board_size = 9
            ko_rule = "superko"
            "#,
        )
        .expect("valid");
        assert_eq!(*config.event_capacity(), 16);
        let rules = config.default_ruleset();
        assert_eq!(rules.board_size, BoardSize::Nine);
        assert_eq!(rules.ko_rule, KoRule::Superko);
        assert_eq!(rules.scoring, ScoringMethod::Territory);
        assert_eq!(rules.komi, 6.5);
    }

    #[test]
    fn test_invalid_ruleset_is_rejected() {
        let err = ServerConfig::from_toml("[default_ruleset]\nhandicap = 1\n")
            .expect_err("handicap 1 is invalid");
        assert!(err.message.contains("Invalid default ruleset"));

        assert!(ServerConfig::from_toml("[default_ruleset]\nboard_size = 11\n").is_err());
    }
}
