//! Lethe CLI - Command-line interface for the Lethe registry tag retention engine.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lethe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Purge(args) => commands::purge::run(args).await,
        Commands::Validate(args) => commands::validate::run(&args),
        Commands::Version => {
            println!("lethe {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
