//! Engine configuration
//!
//! Loaded from a JSON file. Every field has a default, so an empty object
//! is a valid configuration.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event};

/// Largest accepted timezone offset, in seconds
pub const MAX_TIMEZONE_OFFSET_SECS: i64 = 86_400;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read(_) => "LQ_CONFIG_READ",
            ConfigError::Parse(_) => "LQ_CONFIG_PARSE",
            ConfigError::Invalid(_) => "LQ_CONFIG_INVALID",
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hard cap on rendered result rows (default 100000)
    #[serde(default = "default_max_response_rows")]
    pub max_response_rows: u64,

    /// Offset used by queries that do not set one (default 0)
    #[serde(default)]
    pub default_timezone_offset_secs: i64,
}

fn default_max_response_rows() -> u64 {
    100_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_response_rows: default_max_response_rows(),
            default_timezone_offset_secs: 0,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", path.display().to_string().as_str()),
                ("max_response_rows", config.max_response_rows.to_string().as_str()),
            ],
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_response_rows == 0 {
            return Err(ConfigError::Invalid(
                "max_response_rows must be > 0".to_string(),
            ));
        }
        if self.default_timezone_offset_secs.abs() > MAX_TIMEZONE_OFFSET_SECS {
            return Err(ConfigError::Invalid(format!(
                "default_timezone_offset_secs must be within +/-{}, got {}",
                MAX_TIMEZONE_OFFSET_SECS, self.default_timezone_offset_secs
            )));
        }
        Ok(())
    }

    pub fn default_timezone_offset(&self) -> Duration {
        Duration::seconds(self.default_timezone_offset_secs)
    }
}
