use std::path::Path;

use reqwest::StatusCode;

use crate::adapter::inbound::cli::{load_config, output};
use crate::adapter::outbound::nomad::NomadSource;
use crate::error::{Error, Result};

/// Issue one request to the Nomad event endpoint.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let source = NomadSource::new(&config.nomad, config.reconnection.clone())?;

    output::section("Connection Check");
    output::field("Endpoint", source.endpoint());
    output::field(
        "Token",
        if config.nomad.token().is_some() { "set" } else { "none" },
    );

    match source.check_reachable().await {
        Ok(StatusCode::OK) => {
            output::success("Event stream reachable");
            Ok(())
        }
        Ok(status) => {
            output::error(&format!("Event stream returned HTTP {status}"));
            Err(Error::Status { status })
        }
        Err(e) => {
            output::error("Event stream unreachable");
            Err(e)
        }
    }
}
