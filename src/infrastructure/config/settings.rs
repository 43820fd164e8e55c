//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for deployment-specific values like `NOMAD_TOKEN` and `NOMAD_ADDR`.
//!
//! # Example
//!
//! ```no_run
//! use overseer::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging()?;
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::path::Path;

use super::logging::LoggingConfig;
use super::nomad::NomadConfig;
use super::reconnection::ReconnectionConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Nomad event stream settings.
    #[serde(default)]
    pub nomad: NomadConfig,

    /// Event stream reconnection settings.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Path to SQLite database file.
    ///
    /// Defaults to "overseer.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "overseer.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            nomad: NomadConfig::default(),
            reconnection: ReconnectionConfig::default(),
            database: default_database_path(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Applies `NOMAD_ADDR` and `NOMAD_TOKEN` from the environment when set,
    /// so the token never has to live in the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(address) = std::env::var("NOMAD_ADDR") {
            if !address.trim().is_empty() {
                config.nomad.address = address;
            }
        }
        if let Ok(token) = std::env::var("NOMAD_TOKEN") {
            config.nomad.token = Some(token);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize the global tracing subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the logging level does not parse.
    pub fn init_logging(&self) -> Result<()> {
        self.logging.init()
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present and values are within
    /// acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()?;

        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }

        if self.nomad.enabled {
            if self.nomad.address.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "address" }.into());
            }
            match url::Url::parse(&self.nomad.address) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => {
                    return Err(ConfigError::InvalidValue {
                        field: "address",
                        reason: format!("unsupported scheme '{}'", url.scheme()),
                    }
                    .into());
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        field: "address",
                        reason: e.to_string(),
                    }
                    .into());
                }
            }
            if self.nomad.topic.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "topic" }.into());
            }
        }
        if self.nomad.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.reconnection.initial_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.reconnection.max_delay_ms < self.reconnection.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_delay_ms",
                reason: "must be >= initial_delay_ms".to_string(),
            }
            .into());
        }
        if self.reconnection.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
