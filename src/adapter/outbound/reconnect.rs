//! Reconnection delay policy for long-lived streams.
//!
//! Tracks the delay to wait before the next connection attempt. The curve
//! comes from [`ReconnectionConfig`]; callers reset it once a connection has
//! proven healthy.

use std::time::Duration;

use rand::Rng;

use crate::infrastructure::config::reconnection::{BackoffStrategy, ReconnectionConfig};

/// Backoff state for one logical subscription.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectionConfig,
    /// Current backoff delay.
    current_delay_ms: u64,
    /// Consecutive attempts since the last reset.
    attempts: u32,
}

impl Backoff {
    /// Create backoff state starting at the initial delay.
    #[must_use]
    pub fn new(config: ReconnectionConfig) -> Self {
        let initial_delay = config.initial_delay_ms;
        Self {
            config,
            current_delay_ms: initial_delay,
            attempts: 0,
        }
    }

    /// Reset backoff state after a healthy connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
    }

    /// Number of delays handed out since the last reset.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);

        let base_ms = match self.config.strategy {
            BackoffStrategy::Fixed => self.config.initial_delay_ms,
            BackoffStrategy::Exponential => {
                let base = self.current_delay_ms;
                // Increase delay for next attempt
                let next = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
                self.current_delay_ms = next.min(self.config.max_delay_ms);
                base
            }
        };

        Duration::from_millis(base_ms + self.jitter_ms(base_ms))
    }

    fn jitter_ms(&self, base_ms: u64) -> u64 {
        if !self.config.jitter {
            return 0;
        }
        let range = base_ms / 5;
        if range == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..=range)
    }
}
