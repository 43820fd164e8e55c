//! Event stream reconnection configuration.

use serde::Deserialize;

/// Shape of the delay curve between reconnection attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Always wait `initial_delay_ms`.
    #[default]
    Fixed,
    /// Multiply the delay by `backoff_multiplier` after each failed attempt,
    /// capped at `max_delay_ms`.
    Exponential,
}

/// Event stream reconnection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectionConfig {
    /// Delay curve.
    #[serde(default)]
    pub strategy: BackoffStrategy,
    /// Delay before the first reconnection attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Add up to 20% random jitter to each delay.
    #[serde(default)]
    pub jitter: bool,
}

const fn default_initial_delay_ms() -> u64 {
    5000 // 5 seconds
}

const fn default_max_delay_ms() -> u64 {
    60000 // 60 seconds
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::default(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}
