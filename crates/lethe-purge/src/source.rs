//! Registry seam for the purge orchestrator.
//!
//! The orchestrator drives any [`RegistrySource`]; production runs use the
//! HTTP client from `lethe-registry`, tests use an in-memory registry.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lethe_registry::{RegistryClient, RegistryError};

/// The registry operations a purge run needs.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Enumerates the catalog as a namespace to repository-names mapping.
    async fn list_repositories(&self) -> Result<BTreeMap<String, Vec<String>>, RegistryError>;

    /// Lists all tags of a repository.
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError>;

    /// Reads the creation timestamp of the artifact a tag points at.
    ///
    /// `Ok(None)` means the manifest or its metadata is missing, a
    /// recoverable skip condition.
    async fn tag_created_at(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>, RegistryError>;

    /// Deletes a tag.
    async fn delete_tag(&self, repository: &str, tag: &str) -> Result<(), RegistryError>;

    /// Full repository name for a namespace/name pair. Repositories in the
    /// registry's default namespace are addressed bare.
    fn full_repo_name(&self, namespace: &str, name: &str) -> String;
}

#[async_trait]
impl RegistrySource for RegistryClient {
    async fn list_repositories(&self) -> Result<BTreeMap<String, Vec<String>>, RegistryError> {
        Self::list_repositories(self).await
    }

    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        Self::list_tags(self, repository).await
    }

    async fn tag_created_at(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>, RegistryError> {
        Self::tag_created_at(self, repository, tag).await
    }

    async fn delete_tag(&self, repository: &str, tag: &str) -> Result<(), RegistryError> {
        Self::delete_tag(self, repository, tag).await
    }

    fn full_repo_name(&self, namespace: &str, name: &str) -> String {
        self.config().full_repo_name(namespace, name)
    }
}
