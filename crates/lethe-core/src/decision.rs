//! Retention decision types.
//!
//! This module defines the [`Decision`] structure produced by partitioning
//! one retention group.

use serde::{Deserialize, Serialize};

/// The keep/purge split for one retention group.
///
/// Every tag in the group lands in exactly one of the two lists; tags that
/// matched no rule are never part of the group in the first place.
///
/// # Examples
///
/// ```rust
/// use lethe_core::Decision;
///
/// let decision = Decision {
///     keep: vec!["v3".to_string()],
///     purge: vec!["v1".to_string(), "v2".to_string()],
/// };
/// assert_eq!(decision.total(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Tags that survive this run.
    pub keep: Vec<String>,

    /// Tags selected for deletion.
    pub purge: Vec<String>,
}

impl Decision {
    /// Total number of tags covered by this decision.
    #[must_use]
    pub fn total(&self) -> usize {
        self.keep.len() + self.purge.len()
    }

    /// Returns true when the decision covers no tags at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keep.is_empty() && self.purge.is_empty()
    }

    /// Folds another decision into this one.
    ///
    /// Used by the orchestrator to accumulate per-group decisions into a
    /// per-repository decision.
    pub fn merge(&mut self, other: Self) {
        self.keep.extend(other.keep);
        self.purge.extend(other.purge);
    }
}
