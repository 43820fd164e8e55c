//! Command-line interface definitions.
//!
//! Defines the CLI structure for overseer using `clap`: running the version
//! stream, diagnostics, and managing deployment targets.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Track which software version runs where, from Nomad job events
#[derive(Parser, Debug)]
#[command(name = "overseer")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the Nomad event stream and register deployments
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// Manage deployment targets
    #[command(subcommand)]
    Target(TargetCommand),

    /// List registered deployments
    Deployments(DeploymentsArgs),
}

/// Subcommands for `overseer check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config,
    /// Test the connection to the Nomad event endpoint
    Connection,
}

/// Subcommands for `overseer target`.
#[derive(Subcommand, Debug)]
pub enum TargetCommand {
    /// Add a deployment target
    Add(TargetAddArgs),
    /// Set or clear the deployment name of a target
    Link(TargetLinkArgs),
    /// List deployment targets
    List,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for `target add`.
#[derive(Args, Debug)]
pub struct TargetAddArgs {
    /// Environment name (created if missing)
    #[arg(long)]
    pub environment: String,

    /// Application name (created if missing)
    #[arg(long)]
    pub application: String,

    /// Instance name
    #[arg(long)]
    pub name: String,

    /// Workload name to correlate events with (namespace.job.group.task)
    #[arg(long)]
    pub deployment_name: Option<String>,
}

/// Arguments for `target link`.
#[derive(Args, Debug)]
pub struct TargetLinkArgs {
    /// Target id
    pub id: i32,

    /// Workload name; omit to unlink
    #[arg(long)]
    pub deployment_name: Option<String>,
}

/// Arguments for `deployments`.
#[derive(Args, Debug)]
pub struct DeploymentsArgs {
    /// Only show the most recent deployment of each target
    #[arg(long)]
    pub latest: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["overseer", "check", "config", "--config", "other.toml"]);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Check(CheckCommand::Config)));
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from(["overseer", "run", "--log-level", "debug", "--json-logs"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.log_level.as_deref(), Some("debug"));
                assert!(args.json_logs);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn target_add_requires_names() {
        assert!(Cli::try_parse_from(["overseer", "target", "add", "--name", "api"]).is_err());

        let cli = Cli::parse_from([
            "overseer",
            "target",
            "add",
            "--environment",
            "prod",
            "--application",
            "checkout",
            "--name",
            "api-1",
            "--deployment-name",
            "prod.checkout.web.api",
        ]);
        match cli.command {
            Commands::Target(TargetCommand::Add(args)) => {
                assert_eq!(args.deployment_name.as_deref(), Some("prod.checkout.web.api"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
