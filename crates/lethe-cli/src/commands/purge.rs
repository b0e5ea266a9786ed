//! Purge command implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use lethe_core::config::{PolicyFile, RetentionDefaults};
use lethe_purge::{PurgeRunner, RunSummary};
use lethe_registry::{RegistryAuth, RegistryClient, RegistryConfig, TlsConfig};

/// Arguments for the purge command.
#[derive(Args)]
pub struct PurgeArgs {
    /// Registry URL
    #[arg(long, env = "LETHE_REGISTRY_URL")]
    pub registry_url: String,

    /// Path to the YAML retention policy file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Compute and report decisions without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Default age threshold in days, applied by the trailing catch-all rule
    #[arg(long, default_value_t = 30)]
    pub keep_days: i64,

    /// Default minimum surviving tag count, applied by the trailing catch-all rule
    #[arg(long, default_value_t = 10)]
    pub keep_count: usize,

    /// Namespace under which bare repository names live
    #[arg(long, default_value = "library")]
    pub namespace: String,

    /// Username for basic authentication
    #[arg(long, env = "LETHE_REGISTRY_USERNAME")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "LETHE_REGISTRY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Bearer token (mutually exclusive with username/password)
    #[arg(long, env = "LETHE_REGISTRY_TOKEN", hide_env_values = true, conflicts_with = "username")]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Path to a CA certificate for the registry
    #[arg(long)]
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS certificate verification (testing only)
    #[arg(long)]
    pub insecure: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for the purge command.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Runs the purge command.
pub async fn run(args: PurgeArgs) -> Result<()> {
    let policy_file = args
        .config
        .as_deref()
        .map(load_policy_file)
        .transpose()?
        .unwrap_or_default();

    let defaults = RetentionDefaults {
        keep_days: args.keep_days,
        keep_count: args.keep_count,
    };

    info!(
        registry = %args.registry_url,
        rules = policy_file.rules.len(),
        dry_run = args.dry_run,
        "Starting purge run"
    );

    let client = RegistryClient::new(build_registry_config(&args))?;
    let runner = PurgeRunner::new(&policy_file.rules, defaults, args.dry_run);
    let summary = runner.run(&client).await?;

    match args.format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => print_json_summary(&summary)?,
    }

    Ok(())
}

/// Loads and parses the YAML policy file.
pub fn load_policy_file(path: &Path) -> Result<PolicyFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse policy file {}", path.display()))
}

fn build_registry_config(args: &PurgeArgs) -> RegistryConfig {
    let mut config = RegistryConfig::new(&args.registry_url)
        .with_default_namespace(&args.namespace)
        .with_timeout(Duration::from_secs(args.timeout_secs));

    config = match (&args.username, &args.password, &args.token) {
        (Some(username), Some(password), _) => {
            config.with_auth(RegistryAuth::basic(username, password))
        }
        (_, _, Some(token)) => config.with_auth(RegistryAuth::bearer(token)),
        _ => config,
    };

    if args.insecure || args.ca_cert.is_some() {
        let mut tls = TlsConfig::new();
        if let Some(ref ca_cert) = args.ca_cert {
            tls = tls.with_ca_cert(ca_cert);
        }
        if args.insecure {
            tls = tls.insecure();
        }
        config = config.with_tls(tls);
    }

    config
}

fn print_text_summary(summary: &RunSummary) {
    print!("{}", format_text_summary(summary));
}

fn format_text_summary(summary: &RunSummary) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Lethe Purge Summary");
    let _ = writeln!(out, "===================");
    if summary.dry_run {
        let _ = writeln!(out, "(dry-run: no tags were deleted)");
    }
    let _ = writeln!(out);

    for report in &summary.reports {
        let _ = writeln!(
            out,
            "{}: keep {}, purge {}, skipped {}",
            report.repository,
            report.decision.keep.len(),
            report.decision.purge.len(),
            report.skipped_tags
        );
        for tag in &report.decision.purge {
            let marker = if summary.dry_run { "would purge" } else { "purged" };
            let _ = writeln!(out, "  {marker}: {tag}");
        }
        if report.delete_failures > 0 {
            let _ = writeln!(out, "  {} delete(s) failed", report.delete_failures);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Repositories: {} scanned, {} skipped",
        summary.repositories_scanned, summary.repositories_skipped
    );
    let _ = writeln!(
        out,
        "Tags: {} kept, {} purged, {} deleted, {} delete failures, {} skipped",
        summary.tags_kept,
        summary.tags_purged,
        summary.tags_deleted,
        summary.delete_failures,
        summary.skipped_tags
    );
    out
}

fn print_json_summary(summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{json}");
    Ok(())
}
