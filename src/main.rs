use clap::Parser;

use overseer::adapter::inbound::cli::command::Cli;
use overseer::adapter::inbound::cli::{execute, output};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(e) = execute(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
