//! Purge run orchestration.
//!
//! This module drives the overall retention scan: it walks the registry
//! catalog, resolves rules per repository and tag, groups artifacts by
//! resolved rule, partitions each group, and issues deletions (unless the
//! run is a dry run). Nothing here is fatal to the run: malformed patterns
//! skip the current repository, missing metadata skips the single tag, and
//! failed deletes are counted and logged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lethe_core::config::{RepoRuleConfig, RetentionDefaults};
use lethe_core::{Decision, PolicySet, RetentionGroup, TaggedArtifact};
use lethe_registry::RegistryError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::source::RegistrySource;

/// Outcome of scanning one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoReport {
    /// Full repository name.
    pub repository: String,

    /// The keep/purge split across all of the repository's groups.
    pub decision: Decision,

    /// Tags actually deleted (always zero under dry-run).
    pub deleted: usize,

    /// Delete calls the registry rejected.
    pub delete_failures: usize,

    /// Tags left untouched: no tag rule matched, or creation metadata was
    /// unavailable.
    pub skipped_tags: usize,
}

/// Aggregate outcome of one purge run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Repositories that produced a report.
    pub repositories_scanned: usize,

    /// Repositories skipped: rule resolution failed (malformed pattern,
    /// no match without a catch-all) or the tag listing was unavailable.
    pub repositories_skipped: usize,

    /// Total tags kept across all repositories.
    pub tags_kept: usize,

    /// Total tags selected for purge across all repositories.
    pub tags_purged: usize,

    /// Total tags actually deleted.
    pub tags_deleted: usize,

    /// Total rejected delete calls.
    pub delete_failures: usize,

    /// Total tags skipped (unmatched or missing metadata).
    pub skipped_tags: usize,

    /// Per-repository reports, in scan order.
    pub reports: Vec<RepoReport>,
}

impl RunSummary {
    fn absorb(&mut self, report: RepoReport) {
        self.repositories_scanned += 1;
        self.tags_kept += report.decision.keep.len();
        self.tags_purged += report.decision.purge.len();
        self.tags_deleted += report.deleted;
        self.delete_failures += report.delete_failures;
        self.skipped_tags += report.skipped_tags;
        self.reports.push(report);
    }
}

/// Drives retention scans against a registry.
///
/// Built once per run from the policy configuration; the policy set is
/// immutable for the lifetime of the runner. Dry-run and live runs compute
/// identical decisions, only the delete issuance differs.
#[derive(Debug)]
pub struct PurgeRunner {
    policy: PolicySet,
    dry_run: bool,
}

impl PurgeRunner {
    /// Creates a runner from policy configuration and global defaults.
    ///
    /// The defaults become the trailing catch-all rule, so every
    /// repository resolves to some rule.
    #[must_use]
    pub fn new(rules: &[RepoRuleConfig], defaults: RetentionDefaults, dry_run: bool) -> Self {
        Self {
            policy: PolicySet::build(rules, defaults),
            dry_run,
        }
    }

    /// Creates a runner around an existing policy set.
    #[must_use]
    pub const fn with_policy(policy: PolicySet, dry_run: bool) -> Self {
        Self { policy, dry_run }
    }

    /// The policy set this runner evaluates.
    #[must_use]
    pub const fn policy(&self) -> &PolicySet {
        &self.policy
    }

    /// Runs a full scan over the registry catalog.
    ///
    /// Repositories are processed sequentially; each repository's deletes
    /// complete before its report is final. Per-repository and per-tag
    /// failures are logged and counted, never propagated.
    ///
    /// # Errors
    ///
    /// Returns an error only when the catalog itself cannot be enumerated;
    /// there is nothing to scan without it.
    pub async fn run<S: RegistrySource + ?Sized>(
        &self,
        registry: &S,
    ) -> Result<RunSummary, RegistryError> {
        if self.dry_run {
            warn!("Dry-run mode enabled, no tags will be deleted");
        }

        info!("Scanning registry for repositories, tags and their creation dates");
        let catalog = registry.list_repositories().await?;
        let now = Utc::now();

        let mut summary = RunSummary {
            dry_run: self.dry_run,
            ..RunSummary::default()
        };

        for (namespace, repos) in &catalog {
            for name in repos {
                let repository = registry.full_repo_name(namespace, name);
                match self.scan_repository(registry, &repository, now).await {
                    Some(report) => summary.absorb(report),
                    None => summary.repositories_skipped += 1,
                }
            }
        }

        info!(
            scanned = summary.repositories_scanned,
            skipped = summary.repositories_skipped,
            kept = summary.tags_kept,
            purged = summary.tags_purged,
            deleted = summary.tags_deleted,
            delete_failures = summary.delete_failures,
            "Purge run complete"
        );
        Ok(summary)
    }

    /// Scans one repository. `None` means the repository was skipped.
    async fn scan_repository<S: RegistrySource + ?Sized>(
        &self,
        registry: &S,
        repository: &str,
        now: DateTime<Utc>,
    ) -> Option<RepoReport> {
        info!(repository, "Processing repository");

        let repo_rule = match self.policy.resolve_repo_rule(repository) {
            Ok(Some((index, rule))) => {
                debug!(repository, rule = index, pattern = %rule.repo_pattern, "Resolved repository rule");
                rule
            }
            Ok(None) => {
                info!(repository, "No rule matches repository, skipping it");
                return None;
            }
            Err(e) => {
                warn!(repository, error = %e, "Skipping repository, rule pattern does not compile");
                return None;
            }
        };

        let tags = match registry.list_tags(repository).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(repository, error = %e, "Skipping repository, tag listing failed");
                return None;
            }
        };
        debug!(repository, count = tags.len(), "Scanning tags");

        // Group artifacts by resolved tag rule. The rule index is the
        // group key so grouping follows declaration order, never map
        // iteration order.
        let mut groups: BTreeMap<usize, RetentionGroup> = BTreeMap::new();
        let mut skipped_tags = 0;

        for tag in tags {
            let (index, tag_rule) = match repo_rule.resolve_tag_rule(&tag) {
                Ok(Some(resolved)) => resolved,
                Ok(None) => {
                    debug!(repository, tag, "Tag matches no rule, leaving it untouched");
                    skipped_tags += 1;
                    continue;
                }
                Err(e) => {
                    // A malformed tag pattern fails the whole repository,
                    // matching the repository-level behavior.
                    warn!(repository, tag, error = %e, "Skipping repository, tag rule pattern does not compile");
                    return None;
                }
            };

            let created_at = match registry.tag_created_at(repository, &tag).await {
                Ok(Some(created_at)) => created_at,
                Ok(None) => {
                    warn!(repository, tag, "Missing manifest metadata, skipping tag");
                    skipped_tags += 1;
                    continue;
                }
                Err(e) => {
                    warn!(repository, tag, error = %e, "Manifest fetch failed, skipping tag");
                    skipped_tags += 1;
                    continue;
                }
            };

            groups
                .entry(index)
                .or_insert_with(|| RetentionGroup::for_rule(tag_rule))
                .push(TaggedArtifact::new(tag, created_at));
        }

        let mut decision = Decision::default();
        for group in groups.values() {
            decision.merge(group.partition(now));
        }

        info!(
            repository,
            keep = decision.keep.len(),
            purge = decision.purge.len(),
            skipped = skipped_tags,
            "Partitioned repository"
        );

        let mut deleted = 0;
        let mut delete_failures = 0;

        if self.dry_run {
            for tag in &decision.purge {
                info!(repository, tag, "Would purge tag (dry-run)");
            }
        } else {
            for tag in &decision.purge {
                match registry.delete_tag(repository, tag).await {
                    Ok(()) => {
                        info!(repository, tag, "Purged tag");
                        deleted += 1;
                    }
                    Err(e) => {
                        warn!(repository, tag, error = %e, "Failed to delete tag");
                        delete_failures += 1;
                    }
                }
            }
        }

        Some(RepoReport {
            repository: repository.to_string(),
            decision,
            deleted,
            delete_failures,
            skipped_tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration;
    use lethe_core::config::TagRuleConfig;

    use super::*;

    /// In-memory registry: namespace -> repo -> [(tag, created_at)].
    /// A `None` timestamp models missing manifest metadata.
    struct MockRegistry {
        catalog: BTreeMap<String, Vec<(String, Vec<(String, Option<DateTime<Utc>>)>)>>,
        deleted: Mutex<Vec<(String, String)>>,
        fail_deletes_for: Vec<String>,
    }

    impl MockRegistry {
        fn new() -> Self {
            Self {
                catalog: BTreeMap::new(),
                deleted: Mutex::new(Vec::new()),
                fail_deletes_for: Vec::new(),
            }
        }

        fn with_repo(
            mut self,
            namespace: &str,
            name: &str,
            tags: Vec<(&str, Option<DateTime<Utc>>)>,
        ) -> Self {
            self.catalog.entry(namespace.to_string()).or_default().push((
                name.to_string(),
                tags.into_iter()
                    .map(|(tag, created)| (tag.to_string(), created))
                    .collect(),
            ));
            self
        }

        fn failing_deletes(mut self, tag: &str) -> Self {
            self.fail_deletes_for.push(tag.to_string());
            self
        }

        fn deleted(&self) -> Vec<(String, String)> {
            self.deleted.lock().unwrap().clone()
        }

        /// Resolves a full repository name back to its tag listing.
        fn lookup(&self, repository: &str) -> Option<&Vec<(String, Option<DateTime<Utc>>)>> {
            let (namespace, name) = repository
                .split_once('/')
                .map_or(("library", repository), |(ns, rest)| (ns, rest));
            self.catalog
                .get(namespace)?
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, tags)| tags)
        }
    }

    #[async_trait]
    impl RegistrySource for MockRegistry {
        async fn list_repositories(
            &self,
        ) -> Result<BTreeMap<String, Vec<String>>, RegistryError> {
            Ok(self
                .catalog
                .iter()
                .map(|(ns, repos)| {
                    (ns.clone(), repos.iter().map(|(name, _)| name.clone()).collect())
                })
                .collect())
        }

        async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
            Ok(self
                .lookup(repository)
                .map(|tags| tags.iter().map(|(tag, _)| tag.clone()).collect())
                .unwrap_or_default())
        }

        async fn tag_created_at(
            &self,
            repository: &str,
            tag: &str,
        ) -> Result<Option<DateTime<Utc>>, RegistryError> {
            Ok(self
                .lookup(repository)
                .and_then(|tags| tags.iter().find(|(name, _)| name == tag))
                .and_then(|(_, created)| *created))
        }

        async fn delete_tag(&self, repository: &str, tag: &str) -> Result<(), RegistryError> {
            if self.fail_deletes_for.iter().any(|t| t == tag) {
                return Err(RegistryError::DeleteFailed {
                    repository: repository.to_string(),
                    tag: tag.to_string(),
                    status: 405,
                    message: "delete disabled".to_string(),
                });
            }
            self.deleted
                .lock()
                .unwrap()
                .push((repository.to_string(), tag.to_string()));
            Ok(())
        }

        fn full_repo_name(&self, namespace: &str, name: &str) -> String {
            if namespace == "library" {
                name.to_string()
            } else {
                format!("{namespace}/{name}")
            }
        }
    }

    fn rule(repo_regex: &str, tag_rules: Vec<(&str, i64, usize)>) -> RepoRuleConfig {
        RepoRuleConfig {
            repo_regex: repo_regex.to_string(),
            tag_rules: tag_rules
                .into_iter()
                .map(|(tag_regex, keep_days, keep_count)| TagRuleConfig {
                    tag_regex: tag_regex.to_string(),
                    keep_days,
                    keep_count,
                })
                .collect(),
        }
    }

    fn days_ago(days: i64) -> Option<DateTime<Utc>> {
        Some(Utc::now() - Duration::days(days))
    }

    #[tokio::test]
    async fn test_unmatched_tags_are_left_untouched() {
        // `latest` matches no tag rule: absent from keep, purge, and deletes.
        let registry = MockRegistry::new().with_repo(
            "library",
            "library",
            vec![("v12", days_ago(90)), ("latest", days_ago(90))],
        );
        let runner = PurgeRunner::new(
            &[rule("^library$", vec![("^v[0-9]+$", 30, 0)])],
            RetentionDefaults { keep_days: 365, keep_count: 0 },
            false,
        );

        let summary = runner.run(&registry).await.unwrap();

        let report = &summary.reports[0];
        assert_eq!(report.decision.purge, vec!["v12"]);
        assert!(report.decision.keep.is_empty());
        assert_eq!(report.skipped_tags, 1);
        assert_eq!(registry.deleted(), vec![("library".to_string(), "v12".to_string())]);
    }

    #[tokio::test]
    async fn test_dry_run_computes_same_decision_without_deletes() {
        let make_registry = || {
            MockRegistry::new().with_repo(
                "library",
                "nginx",
                vec![("v1", days_ago(200)), ("v2", days_ago(90)), ("v3", days_ago(1))],
            )
        };
        let make_runner = |dry_run| {
            PurgeRunner::new(
                &[],
                RetentionDefaults { keep_days: 30, keep_count: 1 },
                dry_run,
            )
        };

        let live_registry = make_registry();
        let live = make_runner(false).run(&live_registry).await.unwrap();
        let dry_registry = make_registry();
        let dry = make_runner(true).run(&dry_registry).await.unwrap();

        assert_eq!(live.reports[0].decision, dry.reports[0].decision);
        assert_eq!(live.tags_purged, 2);
        assert_eq!(live.tags_deleted, 2);
        assert_eq!(dry.tags_purged, 2);
        assert_eq!(dry.tags_deleted, 0);
        assert!(dry_registry.deleted().is_empty());
        assert_eq!(live_registry.deleted().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_pattern_skips_only_that_repository() {
        let registry = MockRegistry::new()
            .with_repo("library", "broken", vec![("v1", days_ago(90))])
            .with_repo("library", "healthy", vec![("v1", days_ago(90))]);
        // The bad pattern matches nothing structurally; resolution hits it
        // for every repository and errors before reaching the catch-all.
        let runner = PurgeRunner::new(
            &[
                rule("^broken[", vec![(".*", 7, 0)]),
            ],
            RetentionDefaults { keep_days: 30, keep_count: 0 },
            false,
        );

        let summary = runner.run(&registry).await.unwrap();

        // Both repositories hit the malformed pattern and are skipped; the
        // run itself still completes.
        assert_eq!(summary.repositories_skipped, 2);
        assert_eq!(summary.repositories_scanned, 0);
        assert!(registry.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_pattern_after_matching_rule_is_harmless() {
        let registry = MockRegistry::new()
            .with_repo("library", "covered", vec![("v1", days_ago(90))])
            .with_repo("library", "other", vec![("v1", days_ago(90))]);
        let runner = PurgeRunner::new(
            &[
                rule("^covered$", vec![(".*", 7, 0)]),
                rule("^other[", vec![(".*", 7, 0)]),
            ],
            RetentionDefaults { keep_days: 30, keep_count: 0 },
            false,
        );

        let summary = runner.run(&registry).await.unwrap();

        // "covered" resolves before the bad pattern; "other" hits it and
        // is skipped while the run continues.
        assert_eq!(summary.repositories_scanned, 1);
        assert_eq!(summary.repositories_skipped, 1);
        assert_eq!(summary.reports[0].repository, "covered");
        assert_eq!(summary.tags_purged, 1);
    }

    #[tokio::test]
    async fn test_missing_metadata_skips_single_tag() {
        let registry = MockRegistry::new().with_repo(
            "library",
            "nginx",
            vec![("v1", days_ago(90)), ("v2", None), ("v3", days_ago(1))],
        );
        let runner = PurgeRunner::new(
            &[],
            RetentionDefaults { keep_days: 30, keep_count: 0 },
            false,
        );

        let summary = runner.run(&registry).await.unwrap();

        let report = &summary.reports[0];
        assert_eq!(report.skipped_tags, 1);
        assert_eq!(report.decision.keep, vec!["v3"]);
        assert_eq!(report.decision.purge, vec!["v1"]);
    }

    #[tokio::test]
    async fn test_delete_failure_does_not_abort_remaining_tags() {
        let registry = MockRegistry::new()
            .with_repo(
                "library",
                "nginx",
                vec![("v1", days_ago(200)), ("v2", days_ago(100))],
            )
            .failing_deletes("v1");
        let runner = PurgeRunner::new(
            &[],
            RetentionDefaults { keep_days: 30, keep_count: 0 },
            false,
        );

        let summary = runner.run(&registry).await.unwrap();

        assert_eq!(summary.tags_purged, 2);
        assert_eq!(summary.tags_deleted, 1);
        assert_eq!(summary.delete_failures, 1);
        assert_eq!(registry.deleted(), vec![("nginx".to_string(), "v2".to_string())]);
    }

    #[tokio::test]
    async fn test_namespaced_repositories_use_full_names() {
        let registry = MockRegistry::new()
            .with_repo("library", "nginx", vec![("v1", days_ago(90))])
            .with_repo("team-a", "api", vec![("v1", days_ago(90))]);
        let runner = PurgeRunner::new(
            &[],
            RetentionDefaults { keep_days: 30, keep_count: 0 },
            false,
        );

        let summary = runner.run(&registry).await.unwrap();

        let mut names: Vec<&str> = summary
            .reports
            .iter()
            .map(|r| r.repository.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["nginx", "team-a/api"]);
    }

    #[tokio::test]
    async fn test_groups_partition_independently() {
        // Release tags keep 2 regardless of age; sha tags have no floor.
        let registry = MockRegistry::new().with_repo(
            "library",
            "app",
            vec![
                ("v1", days_ago(400)),
                ("v2", days_ago(300)),
                ("v3", days_ago(200)),
                ("sha-aaaa111", days_ago(100)),
                ("sha-bbbb222", days_ago(1)),
            ],
        );
        let runner = PurgeRunner::new(
            &[rule("^app$", vec![("^v", 30, 2), ("^sha-", 30, 0)])],
            RetentionDefaults { keep_days: 365, keep_count: 0 },
            false,
        );

        let summary = runner.run(&registry).await.unwrap();

        let report = &summary.reports[0];
        // v-group: all stale, floor rescues the two newest (v3, v2).
        // sha-group: one stale, one fresh.
        assert_eq!(report.decision.keep, vec!["v3", "v2", "sha-bbbb222"]);
        assert_eq!(report.decision.purge, vec!["v1", "sha-aaaa111"]);
    }

    #[tokio::test]
    async fn test_empty_repository_reports_empty_decision() {
        let registry = MockRegistry::new().with_repo("library", "empty", vec![]);
        let runner = PurgeRunner::new(
            &[],
            RetentionDefaults::default(),
            false,
        );

        let summary = runner.run(&registry).await.unwrap();

        assert_eq!(summary.repositories_scanned, 1);
        assert!(summary.reports[0].decision.is_empty());
    }

    #[tokio::test]
    async fn test_summary_serializes_to_json() {
        let registry =
            MockRegistry::new().with_repo("library", "nginx", vec![("v1", days_ago(90))]);
        let runner = PurgeRunner::new(
            &[],
            RetentionDefaults { keep_days: 30, keep_count: 0 },
            true,
        );

        let summary = runner.run(&registry).await.unwrap();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains(r#""dry_run":true"#));
        assert!(json.contains(r#""purge":["v1"]"#));
    }
}
