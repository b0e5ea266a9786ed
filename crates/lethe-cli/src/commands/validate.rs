//! Validate command implementation.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use lethe_core::config::RetentionDefaults;
use lethe_core::PolicySet;

use super::purge::load_policy_file;

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the YAML retention policy file
    #[arg(short, long)]
    pub config: PathBuf,
}

/// Runs the validate command.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let file = load_policy_file(&args.config)?;
    let set = PolicySet::build(&file.rules, RetentionDefaults::default());

    if let Err(e) = set.check_patterns() {
        bail!("Policy file {} is invalid: {e}", args.config.display());
    }

    let tag_rules: usize = file.rules.iter().map(|rule| rule.tag_rules.len()).sum();
    println!(
        "{}: OK ({} repository rules, {} tag rules, plus the catch-all)",
        args.config.display(),
        file.rules.len(),
        tag_rules
    );
    Ok(())
}
