//! Handler for the `deployments` command.

use std::path::Path;

use chrono::SecondsFormat;
use tabled::Tabled;

use super::command::DeploymentsArgs;
use super::{load_config, output};
use crate::adapter::outbound::sqlite::database::connection::open;
use crate::adapter::outbound::sqlite::SqliteTargetRegistry;
use crate::domain::DeploymentRecord;
use crate::error::Result;

#[derive(Tabled)]
struct DeploymentRow {
    #[tabled(rename = "Target")]
    target: i32,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Deployed At")]
    deployed_at: String,
}

impl From<DeploymentRecord> for DeploymentRow {
    fn from(record: DeploymentRecord) -> Self {
        Self {
            target: record.target_id.get(),
            version: record.version,
            deployed_at: record.deployed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// List registered deployments.
pub fn execute(config_path: &Path, args: &DeploymentsArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let registry = SqliteTargetRegistry::new(open(&config.database)?);
    let records = if args.latest {
        registry.latest_deployments()?
    } else {
        registry.list_deployments()?
    };

    output::section(if args.latest {
        "Current versions"
    } else {
        "Deployments"
    });
    if records.is_empty() {
        output::note("No deployments registered.");
        return Ok(());
    }

    output::table(records.into_iter().map(DeploymentRow::from).collect());
    Ok(())
}
