//! Retention policy model and rule resolution.
//!
//! This module defines the executable form of a retention policy: an ordered
//! [`PolicySet`] of repository rules, each owning an ordered list of
//! [`TagRule`]s, with first-match-wins resolution at both levels.

use regex::Regex;

use crate::config::{RepoRuleConfig, RetentionDefaults, TagRuleConfig};
use crate::error::{Error, Result};

/// A tag-matching rule with its retention thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    /// Regular expression source matched (unanchored) against tag names.
    pub tag_pattern: String,

    /// Age threshold in whole days.
    pub keep_days: i64,

    /// Minimum number of matched tags that survive regardless of age.
    pub keep_count: usize,
}

impl TagRule {
    /// Returns true when `tag` matches this rule's pattern anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern does not compile.
    pub fn matches(&self, tag: &str) -> Result<bool> {
        let re = compile(&self.tag_pattern)?;
        Ok(re.is_match(tag))
    }
}

/// A repository-matching rule carrying its ordered tag rules.
///
/// A configuration with a single tag rule is just the degenerate length-1
/// case; there is no separate single-rule schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRule {
    /// Regular expression source matched (unanchored) against the full
    /// repository name.
    pub repo_pattern: String,

    /// Ordered tag rules. Never empty for a well-formed policy set.
    pub tag_rules: Vec<TagRule>,
}

impl RepoRule {
    /// Resolves the first tag rule matching `tag`, in declared order.
    ///
    /// Returns the rule's index alongside the rule itself; the index is the
    /// rule's stable identity within this repository rule and is what
    /// callers group artifacts by.
    ///
    /// `Ok(None)` means no tag rule matched: the tag is outside the policy
    /// and is left untouched in the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] on the first malformed pattern
    /// encountered before a match is found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lethe_core::{RepoRule, TagRule};
    ///
    /// let rule = RepoRule {
    ///     repo_pattern: "^library$".to_string(),
    ///     tag_rules: vec![TagRule {
    ///         tag_pattern: "^v[0-9]+$".to_string(),
    ///         keep_days: 30,
    ///         keep_count: 2,
    ///     }],
    /// };
    /// assert!(rule.resolve_tag_rule("v12").unwrap().is_some());
    /// assert!(rule.resolve_tag_rule("latest").unwrap().is_none());
    /// ```
    pub fn resolve_tag_rule(&self, tag: &str) -> Result<Option<(usize, &TagRule)>> {
        for (index, rule) in self.tag_rules.iter().enumerate() {
            if rule.matches(tag)? {
                return Ok(Some((index, rule)));
            }
        }
        Ok(None)
    }
}

/// An ordered, immutable set of repository rules with a trailing catch-all.
///
/// Built once from configuration at the start of a purge run. The catch-all
/// rule (matches every repository and every tag, using the caller-supplied
/// defaults) is appended last, so every repository resolves to *some* rule
/// unless a pattern earlier in the list is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySet {
    rules: Vec<RepoRule>,
}

impl PolicySet {
    /// Builds a policy set from configuration plus global defaults.
    ///
    /// Declaration order is preserved; the defaults become the trailing
    /// catch-all rule. Patterns are *not* compiled here: compilation happens
    /// during resolution so that a malformed pattern fails the repository
    /// being evaluated rather than the whole run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lethe_core::config::RetentionDefaults;
    /// use lethe_core::PolicySet;
    ///
    /// let set = PolicySet::build(&[], RetentionDefaults::default());
    /// // The catch-all is always present.
    /// assert_eq!(set.len(), 1);
    /// ```
    #[must_use]
    pub fn build(rules: &[RepoRuleConfig], defaults: RetentionDefaults) -> Self {
        let mut compiled: Vec<RepoRule> = rules
            .iter()
            .map(|rule| RepoRule {
                repo_pattern: rule.repo_regex.clone(),
                tag_rules: rule.tag_rules.iter().map(TagRule::from).collect(),
            })
            .collect();

        compiled.push(RepoRule {
            repo_pattern: ".*".to_string(),
            tag_rules: vec![TagRule {
                tag_pattern: ".*".to_string(),
                keep_days: defaults.keep_days,
                keep_count: defaults.keep_count,
            }],
        });

        Self { rules: compiled }
    }

    /// Number of rules, including the catch-all.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the set holds no rules at all.
    ///
    /// Never true for a set produced by [`PolicySet::build`], which always
    /// appends the catch-all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[RepoRule] {
        &self.rules
    }

    /// Resolves the first repository rule matching `repo`, in declared order.
    ///
    /// Matching is unanchored: the pattern may match any substring of the
    /// repository name. Returns the rule's index (its stable identity)
    /// alongside the rule. `Ok(None)` only occurs when the catch-all is
    /// absent, i.e. under malformed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] on the first malformed pattern
    /// encountered before a match is found. Callers treat this as "skip the
    /// current repository".
    pub fn resolve_repo_rule(&self, repo: &str) -> Result<Option<(usize, &RepoRule)>> {
        for (index, rule) in self.rules.iter().enumerate() {
            let re = compile(&rule.repo_pattern)?;
            if re.is_match(repo) {
                return Ok(Some((index, rule)));
            }
        }
        Ok(None)
    }

    /// Compiles every pattern in the set, returning the first failure.
    ///
    /// Used by `lethe validate` to check a policy file up front; the purge
    /// run itself compiles lazily per repository.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for the first pattern that does not
    /// compile.
    pub fn check_patterns(&self) -> Result<()> {
        for rule in &self.rules {
            compile(&rule.repo_pattern)?;
            for tag_rule in &rule.tag_rules {
                compile(&tag_rule.tag_pattern)?;
            }
        }
        Ok(())
    }
}

impl From<&TagRuleConfig> for TagRule {
    fn from(config: &TagRuleConfig) -> Self {
        Self {
            tag_pattern: config.tag_regex.clone(),
            keep_days: config.keep_days,
            keep_count: config.keep_count,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
