//! Handlers for the `target` command group.

use std::path::Path;

use tabled::Tabled;

use super::command::{TargetAddArgs, TargetLinkArgs};
use super::{load_config, output};
use crate::adapter::outbound::sqlite::database::connection::open;
use crate::adapter::outbound::sqlite::SqliteTargetRegistry;
use crate::domain::{DeploymentName, Instance, NewInstance, TargetId};
use crate::error::Result;

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "ID")]
    id: i32,
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Application")]
    application: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Deployment Name")]
    deployment_name: String,
}

impl From<Instance> for TargetRow {
    fn from(instance: Instance) -> Self {
        Self {
            id: instance.id.get(),
            environment: instance.environment,
            application: instance.application,
            name: instance.name,
            deployment_name: instance
                .deployment_name
                .map_or_else(|| "-".to_string(), |name| name.to_string()),
        }
    }
}

fn registry(config_path: &Path) -> Result<SqliteTargetRegistry> {
    let config = load_config(config_path)?;
    Ok(SqliteTargetRegistry::new(open(&config.database)?))
}

/// Normalize an optional deployment name argument; blank means none.
fn deployment_name(raw: Option<&str>) -> Option<DeploymentName> {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(DeploymentName::from)
}

/// Add a deployment target.
pub fn add(config_path: &Path, args: &TargetAddArgs) -> Result<()> {
    let registry = registry(config_path)?;
    let environment = registry.ensure_environment(&args.environment)?;
    let application = registry.ensure_application(&args.application)?;
    let id = registry.create_instance(&NewInstance {
        environment_id: environment.id,
        application_id: application.id,
        name: args.name.clone(),
        deployment_name: deployment_name(args.deployment_name.as_deref()),
    })?;

    output::success(&format!(
        "Added target {} ({} / {} / {})",
        output::highlight(id),
        environment.name,
        application.name,
        args.name.trim()
    ));
    Ok(())
}

/// Set or clear a target's deployment name.
pub fn link(config_path: &Path, args: &TargetLinkArgs) -> Result<()> {
    let registry = registry(config_path)?;
    let name = deployment_name(args.deployment_name.as_deref());
    registry.set_deployment_name(TargetId::new(args.id), name.as_ref())?;

    match name {
        Some(name) => output::success(&format!(
            "Target {} now follows {}",
            args.id,
            output::highlight(name)
        )),
        None => output::success(&format!("Target {} unlinked", args.id)),
    }
    Ok(())
}

/// List deployment targets.
pub fn list(config_path: &Path) -> Result<()> {
    let instances = registry(config_path)?.list_instances()?;

    output::section("Deployment targets");
    if instances.is_empty() {
        output::note("No targets yet. Add one with `overseer target add`.");
        return Ok(());
    }

    output::table(instances.into_iter().map(TargetRow::from).collect());
    Ok(())
}
