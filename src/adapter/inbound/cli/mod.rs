//! CLI module graph and command dispatch.

pub mod check;
pub mod command;
pub mod deployments;
pub mod output;
pub mod run;
pub mod target;

use std::path::Path;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

use command::{CheckCommand, Cli, Commands, TargetCommand};

/// Execute the parsed command line.
///
/// # Errors
///
/// Returns the first error raised by the selected command.
pub async fn execute(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => run::execute(&cli.config, args).await,
        Commands::Check(CheckCommand::Config) => check::config::execute(&cli.config),
        Commands::Check(CheckCommand::Connection) => {
            check::connection::execute(&cli.config).await
        }
        Commands::Target(TargetCommand::Add(args)) => target::add(&cli.config, args),
        Commands::Target(TargetCommand::Link(args)) => target::link(&cli.config, args),
        Commands::Target(TargetCommand::List) => target::list(&cli.config),
        Commands::Deployments(args) => deployments::execute(&cli.config, args),
    }
}

/// Load configuration, falling back to defaults when the file is absent.
///
/// Environment overrides apply in both cases.
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Config::parse_toml("")
    }
}
