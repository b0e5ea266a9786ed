//! Configuration schema for retention policy files.
//!
//! This module defines the serde types for the YAML policy file consumed by
//! the CLI. The raw configuration is turned into an executable
//! [`PolicySet`](crate::PolicySet) via [`PolicySet::build`](crate::PolicySet::build).

use serde::{Deserialize, Serialize};

/// A single tag-matching rule with its retention thresholds.
///
/// # Examples
///
/// ```rust
/// use lethe_core::config::TagRuleConfig;
///
/// let rule: TagRuleConfig = serde_yaml::from_str(
///     "tag_regex: '^v[0-9]+'\nkeep_days: 30\nkeep_count: 5\n",
/// ).unwrap();
/// assert_eq!(rule.keep_days, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRuleConfig {
    /// Regular expression matched (unanchored) against tag names.
    pub tag_regex: String,

    /// Age threshold in whole days. Tags older than this are purge
    /// candidates. Negative values mark every non-future tag as stale.
    #[serde(default)]
    pub keep_days: i64,

    /// Minimum number of matched tags that survive regardless of age.
    /// Zero disables the floor.
    #[serde(default)]
    pub keep_count: usize,
}

/// A repository-matching rule carrying an ordered list of tag rules.
///
/// Rules are evaluated in declared order; the first repository rule whose
/// `repo_regex` matches wins, and within it the first matching tag rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRuleConfig {
    /// Regular expression matched (unanchored) against the full repository
    /// name (`namespace/name`, or bare `name` in the default namespace).
    pub repo_regex: String,

    /// Ordered tag rules owned by this repository rule.
    pub tag_rules: Vec<TagRuleConfig>,
}

/// Root of the YAML policy document.
///
/// # Examples
///
/// ```rust
/// use lethe_core::config::PolicyFile;
///
/// let file: PolicyFile = serde_yaml::from_str(r"
/// rules:
///   - repo_regex: '^ci/'
///     tag_rules:
///       - tag_regex: '^nightly-'
///         keep_days: 7
///         keep_count: 3
/// ").unwrap();
/// assert_eq!(file.rules.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFile {
    /// Ordered repository rules. May be empty; the caller-supplied defaults
    /// always apply as a trailing catch-all.
    #[serde(default)]
    pub rules: Vec<RepoRuleConfig>,
}

/// Global retention defaults applied as the trailing catch-all rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionDefaults {
    /// Default age threshold in whole days.
    pub keep_days: i64,

    /// Default minimum surviving tag count.
    pub keep_count: usize,
}

impl Default for RetentionDefaults {
    fn default() -> Self {
        Self {
            keep_days: 30,
            keep_count: 10,
        }
    }
}
