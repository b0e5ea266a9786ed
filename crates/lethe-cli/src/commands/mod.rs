//! CLI commands and argument parsing.

pub mod purge;
pub mod validate;

use clap::{Parser, Subcommand};

/// Lethe - Tag retention engine for Docker/OCI registries
#[derive(Parser)]
#[command(name = "lethe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Scan the registry and purge tags per the retention policy
    Purge(purge::PurgeArgs),

    /// Validate a retention policy file
    Validate(validate::ValidateArgs),

    /// Print version information
    Version,
}
