//! Retention partitioning for groups of tagged artifacts.
//!
//! A [`RetentionGroup`] holds the tags of one repository that resolved to
//! the same tag rule, together with that rule's thresholds. Partitioning
//! splits the group into keep and purge lists, honoring the age threshold
//! first and then the minimum-count floor.

use std::cmp::Reverse;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::Decision;
use crate::policy::TagRule;

/// A tag together with the creation time of the artifact it points at.
///
/// Ephemeral: produced per tag while scanning one repository and discarded
/// once the group is partitioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedArtifact {
    /// Tag name.
    pub name: String,

    /// Creation time of the artifact the tag points at.
    pub created_at: DateTime<Utc>,
}

impl TaggedArtifact {
    /// Creates a tagged artifact.
    #[must_use]
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at,
        }
    }
}

impl fmt::Display for TaggedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{} <{}>\"",
            self.name,
            self.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// The artifacts of one repository sharing a resolved tag rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionGroup {
    /// Age threshold in whole days; artifacts strictly older are purge
    /// candidates. Negative values make every non-future artifact stale.
    pub keep_days: i64,

    /// Minimum number of artifacts that survive regardless of age.
    /// Zero disables the floor.
    pub keep_count: usize,

    /// Group members, in registry listing order.
    pub artifacts: Vec<TaggedArtifact>,
}

impl RetentionGroup {
    /// Creates an empty group with the thresholds of `rule`.
    #[must_use]
    pub fn for_rule(rule: &TagRule) -> Self {
        Self {
            keep_days: rule.keep_days,
            keep_count: rule.keep_count,
            artifacts: Vec::new(),
        }
    }

    /// Adds an artifact to the group.
    pub fn push(&mut self, artifact: TaggedArtifact) {
        self.artifacts.push(artifact);
    }

    /// Number of artifacts in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Returns true when the group has no artifacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Splits the group into keep and purge lists.
    ///
    /// Artifacts are sorted newest-first (stable, so equal timestamps keep
    /// their input order and the result is deterministic within a run).
    /// An artifact whose age in whole days exceeds `keep_days` is
    /// tentatively purged. The count floor then rescues tentatively-purged
    /// artifacts, newest first, until at least `min(keep_count, len)`
    /// artifacts survive.
    ///
    /// Pure: calling this twice with the same `now` yields the same
    /// decision.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::{Duration, Utc};
    /// use lethe_core::{RetentionGroup, TaggedArtifact};
    ///
    /// let now = Utc::now();
    /// let group = RetentionGroup {
    ///     keep_days: 30,
    ///     keep_count: 0,
    ///     artifacts: vec![
    ///         TaggedArtifact::new("fresh", now - Duration::days(1)),
    ///         TaggedArtifact::new("stale", now - Duration::days(90)),
    ///     ],
    /// };
    /// let decision = group.partition(now);
    /// assert_eq!(decision.keep, vec!["fresh"]);
    /// assert_eq!(decision.purge, vec!["stale"]);
    /// ```
    #[must_use]
    pub fn partition(&self, now: DateTime<Utc>) -> Decision {
        let mut sorted = self.artifacts.clone();
        sorted.sort_by_key(|artifact| Reverse(artifact.created_at));

        let mut keep = Vec::new();
        let mut purge = Vec::new();

        for artifact in sorted {
            // Whole days, truncating toward zero; a 23-hour-old artifact
            // has age 0.
            let age_days = (now - artifact.created_at).num_hours() / 24;
            if age_days > self.keep_days {
                purge.push(artifact.name);
            } else {
                keep.push(artifact.name);
            }
        }

        // Count floor: rescue the newest purge candidates until at least
        // keep_count artifacts survive.
        if self.artifacts.len() - purge.len() < self.keep_count {
            if purge.len() > self.keep_count {
                keep.extend(purge.drain(..self.keep_count));
            } else {
                keep.append(&mut purge);
            }
        }

        Decision { keep, purge }
    }
}
