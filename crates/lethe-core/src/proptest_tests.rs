//! Property-based tests for lethe-core types.
//!
//! These tests use proptest to verify invariants across many randomly
//! generated retention groups.

use chrono::{Duration, Utc};
use proptest::prelude::*;

use crate::{RetentionGroup, TaggedArtifact};

/// Strategy for generating tag names.
fn tag_name_strategy() -> impl Strategy<Value = String> {
    "(v[0-9]{1,3}(\\.[0-9]{1,2}){0,2}|sha-[a-f0-9]{7}|nightly-[0-9]{8}|latest|stable)"
}

/// Strategy for generating artifact ages in hours (up to ~3 years).
fn age_hours_strategy() -> impl Strategy<Value = i64> {
    0i64..26_000
}

/// Strategy for generating retention groups with distinct tag names.
fn group_strategy() -> impl Strategy<Value = RetentionGroup> {
    (
        -2i64..400,
        0usize..12,
        prop::collection::btree_map(tag_name_strategy(), age_hours_strategy(), 0..24),
    )
        .prop_map(|(keep_days, keep_count, members)| {
            let now = Utc::now();
            RetentionGroup {
                keep_days,
                keep_count,
                artifacts: members
                    .into_iter()
                    .map(|(name, hours)| TaggedArtifact::new(name, now - Duration::hours(hours)))
                    .collect(),
            }
        })
}

proptest! {
    /// Partitioning is a complete split: every tag lands in exactly one
    /// of keep/purge.
    #[test]
    fn partition_is_complete_split(group in group_strategy()) {
        let now = Utc::now();
        let decision = group.partition(now);

        prop_assert_eq!(decision.total(), group.len());

        let mut names: Vec<&str> = decision
            .keep
            .iter()
            .chain(decision.purge.iter())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), group.len(), "no tag is duplicated or lost");
    }

    /// The count floor is never violated: at least min(keep_count, len)
    /// tags survive.
    #[test]
    fn floor_invariant_holds(group in group_strategy()) {
        let decision = group.partition(Utc::now());
        prop_assert!(decision.keep.len() >= group.keep_count.min(group.len()));
    }

    /// With keep_count = 0 the floor has no effect: the split is exactly
    /// the age threshold.
    #[test]
    fn zero_floor_is_pure_age_split(group in group_strategy()) {
        let now = Utc::now();
        let unfloored = RetentionGroup { keep_count: 0, ..group.clone() };
        let decision = unfloored.partition(now);

        for artifact in &group.artifacts {
            let age_days = (now - artifact.created_at).num_hours() / 24;
            if age_days > group.keep_days {
                prop_assert!(decision.purge.contains(&artifact.name));
            } else {
                prop_assert!(decision.keep.contains(&artifact.name));
            }
        }
    }

    /// Partitioning is idempotent for a fixed `now`.
    #[test]
    fn partition_is_idempotent(group in group_strategy()) {
        let now = Utc::now();
        prop_assert_eq!(group.partition(now), group.partition(now));
    }

    /// Rescued tags are always the newest of the purge candidates: no
    /// purged tag may be newer than a kept tag that was stale.
    #[test]
    fn rescue_prefers_newest(group in group_strategy()) {
        let now = Utc::now();
        let decision = group.partition(now);

        let created = |name: &str| {
            group
                .artifacts
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.created_at)
                .unwrap()
        };
        let stale = |name: &str| (now - created(name)).num_hours() / 24 > group.keep_days;

        for kept in decision.keep.iter().filter(|name| stale(name)) {
            for purged in &decision.purge {
                prop_assert!(created(kept) >= created(purged));
            }
        }
    }
}
