//! Logging configuration and subscriber installation.
//!
//! `RUST_LOG`, when set, replaces the configured level at start-up; the
//! configured level is still validated so a bad file is caught by
//! `check config`.

use std::fmt;

use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, Result};

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `info` or `overseer=debug,reqwest=warn`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".into()
}

impl LoggingConfig {
    /// Check that `level` parses as filter directives.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for `level` otherwise.
    pub fn validate(&self) -> Result<()> {
        self.configured_filter().map(|_| ())
    }

    fn configured_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.level).map_err(|e| {
            ConfigError::InvalidValue {
                field: "level",
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Install the global tracing subscriber.
    ///
    /// A subscriber that is already installed is left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured level does not parse.
    pub fn init(&self) -> Result<()> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => self.configured_filter()?,
        };

        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
        };
        if installed.is_err() {
            debug!("Tracing subscriber already installed");
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}
