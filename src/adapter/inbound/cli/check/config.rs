use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;

/// Validate configuration file without starting the stream.
pub fn execute(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        output::note("Create one by copying the example: cp config.toml.example config.toml");
        return Err(ConfigError::ReadFile(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", config_path.display()),
        ))
        .into());
    }

    let config = Config::load(config_path)?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Configuration Check");
    output::field("Config", config_path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Database", &config.database);
    output::field("Log level", &config.logging.level);
    output::field("Log format", config.logging.format);
    if config.nomad.enabled {
        output::field("Nomad", &config.nomad.address);
        output::field("Topic", &config.nomad.topic);
        output::field("Queue", config.nomad.channel_capacity);
        output::field("Resume", config.nomad.resume);
        output::field(
            "Reconnect",
            format!(
                "{:?} from {}ms",
                config.reconnection.strategy, config.reconnection.initial_delay_ms
            ),
        );
        if config.nomad.token().is_some() {
            output::success("Nomad ACL token configured");
        } else {
            output::warning("No Nomad ACL token (set NOMAD_TOKEN if ACLs are enabled)");
        }
    } else {
        output::field("Nomad", "disabled");
    }

    Ok(())
}
