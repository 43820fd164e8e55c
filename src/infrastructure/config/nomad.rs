//! Nomad event stream settings.

use serde::Deserialize;

/// Connection settings for the Nomad event stream.
#[derive(Debug, Clone, Deserialize)]
pub struct NomadConfig {
    /// Follow the Nomad event stream. When false the pipeline idles until
    /// shutdown.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base address of the Nomad HTTP API.
    #[serde(default = "default_address")]
    pub address: String,
    /// ACL token sent as `X-Nomad-Token`. Overridden by `NOMAD_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
    /// Server-side topic filter.
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Capacity of the bounded deployment event queue.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Persist the stream index and resume from it after restarts.
    #[serde(default = "default_resume")]
    pub resume: bool,
}

const fn default_enabled() -> bool {
    true
}

fn default_address() -> String {
    "http://127.0.0.1:4646".into()
}

fn default_topic() -> String {
    "Job".into()
}

const fn default_channel_capacity() -> usize {
    10
}

const fn default_resume() -> bool {
    true
}

impl NomadConfig {
    /// Token to send, ignoring blank values.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl Default for NomadConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            address: default_address(),
            token: None,
            topic: default_topic(),
            channel_capacity: default_channel_capacity(),
            resume: default_resume(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_ignored() {
        let config = NomadConfig {
            token: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(config.token(), None);
    }

    #[test]
    fn token_is_trimmed() {
        let config = NomadConfig {
            token: Some(" secret \n".into()),
            ..Default::default()
        };
        assert_eq!(config.token(), Some("secret"));
    }
}
