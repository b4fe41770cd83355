//! levy-cli configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Command line flags override the loaded values.

use std::env;
use std::path::PathBuf;

use levy_directory::DEFAULT_RATES_PATH;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Rate table file
    pub rates_path: PathBuf,

    /// tracing filter directive, e.g. `info` or `levy_core=debug`
    pub log_filter: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            rates_path: PathBuf::from(DEFAULT_RATES_PATH),
            log_filter: "info".to_string(),
            pretty: true,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CliConfig::default();

        let rates_path = match lookup("LEVY_RATES_PATH") {
            Some(path) if path.trim().is_empty() => {
                return Err(ConfigError::MissingRequired("LEVY_RATES_PATH".to_string()))
            }
            Some(path) => PathBuf::from(path),
            None => defaults.rates_path,
        };

        let log_filter = lookup("LEVY_LOG").unwrap_or(defaults.log_filter);
        validate_filter("LEVY_LOG", &log_filter)?;

        let pretty = match lookup("LEVY_PRETTY") {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| ConfigError::InvalidValue("LEVY_PRETTY".to_string()))?,
            None => defaults.pretty,
        };

        Ok(CliConfig {
            rates_path,
            log_filter,
            pretty,
        })
    }

    /// Applies command line flags on top of the loaded values.
    pub fn with_overrides(
        mut self,
        rates_path: Option<PathBuf>,
        log_filter: Option<String>,
        compact: bool,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = rates_path {
            self.rates_path = path;
        }
        if let Some(filter) = log_filter {
            validate_filter("--log", &filter)?;
            self.log_filter = filter;
        }
        if compact {
            self.pretty = false;
        }
        Ok(self)
    }
}

fn validate_filter(source: &str, filter: &str) -> Result<(), ConfigError> {
    EnvFilter::try_new(filter)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidValue(source.to_string()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
