//! Handler for the `run` command.

use std::path::Path;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::command::RunArgs;
use super::load_config;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::logging::LogFormat;

/// Execute the run command.
pub async fn execute(config_path: &Path, args: &RunArgs) -> Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = LogFormat::Json;
    }
    config.init_logging()?;

    info!(version = env!("CARGO_PKG_VERSION"), "overseer starting");
    if !config_path.exists() {
        warn!(path = %config_path.display(), "Config file not found, using defaults");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        let _ = shutdown_tx.send(true);
    });

    match bootstrap::run(&config, shutdown_rx).await {
        Ok(summary) => {
            info!(
                received = summary.received,
                registered = summary.registered,
                "overseer stopped"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Fatal error");
            Err(e)
        }
    }
}
