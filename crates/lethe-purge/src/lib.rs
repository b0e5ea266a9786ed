//! # Lethe Purge
//!
//! Purge orchestration for the Lethe registry tag retention engine.
//!
//! This crate drives the retention scan end to end: it walks the catalog of
//! a [`RegistrySource`], resolves retention rules per repository and tag,
//! partitions each rule's group of tags into keep and purge lists, and
//! issues deletions unless the run is a dry run.
//!
//! ## Example
//!
//! ```no_run
//! use lethe_core::config::RetentionDefaults;
//! use lethe_purge::PurgeRunner;
//! use lethe_registry::{RegistryClient, RegistryConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RegistryClient::new(RegistryConfig::new("https://registry.example.com"))?;
//! let runner = PurgeRunner::new(&[], RetentionDefaults::default(), true);
//!
//! let summary = runner.run(&client).await?;
//! println!("would purge {} tags", summary.tags_purged);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod runner;
pub mod source;

// Re-export main types at crate root
pub use runner::{PurgeRunner, RepoReport, RunSummary};
pub use source::RegistrySource;
