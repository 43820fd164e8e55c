//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use crate::infrastructure::config::nomad::NomadConfig;
use crate::infrastructure::config::reconnection::{BackoffStrategy, ReconnectionConfig};

/// Fast reconnection config with a short fixed delay.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        strategy: BackoffStrategy::Fixed,
        initial_delay_ms: 10,
        max_delay_ms: 10,
        backoff_multiplier: 1.0,
        jitter: false,
    }
}

/// Nomad config pointed at a local test server.
pub fn nomad(address: &str) -> NomadConfig {
    NomadConfig {
        address: address.to_string(),
        token: Some("test-token".into()),
        ..Default::default()
    }
}
