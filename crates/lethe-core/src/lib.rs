//! # Lethe Core
//!
//! Core retention policy model and decision logic for the Lethe registry
//! tag retention engine.
//!
//! This crate provides the pure, I/O-free pieces of the system:
//!
//! - [`PolicySet`] - Ordered repository/tag rules with first-match-wins
//!   resolution and a trailing catch-all
//! - [`RetentionGroup`] - Per-rule groups of tagged artifacts and the
//!   keep/purge partitioning algorithm
//! - [`Decision`] - The keep/purge split for one group
//! - [`config`] - serde schema for the YAML policy file
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use lethe_core::config::RetentionDefaults;
//! use lethe_core::{PolicySet, RetentionGroup, TaggedArtifact};
//!
//! let set = PolicySet::build(&[], RetentionDefaults { keep_days: 30, keep_count: 2 });
//! let (_, rule) = set.resolve_repo_rule("library/nginx").unwrap().unwrap();
//! let (_, tag_rule) = rule.resolve_tag_rule("v1").unwrap().unwrap();
//!
//! let now = Utc::now();
//! let mut group = RetentionGroup::for_rule(tag_rule);
//! group.push(TaggedArtifact::new("v1", now - Duration::days(90)));
//! group.push(TaggedArtifact::new("v2", now - Duration::days(1)));
//!
//! let decision = group.partition(now);
//! // keep_count=2 rescues the stale tag.
//! assert!(decision.purge.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod decision;
pub mod error;
pub mod policy;
pub mod retention;

#[cfg(test)]
mod proptest_tests;

// Re-export main types at crate root
pub use decision::Decision;
pub use error::{Error, Result};
pub use policy::{PolicySet, RepoRule, TagRule};
pub use retention::{RetentionGroup, TaggedArtifact};
