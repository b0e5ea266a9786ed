//! Docker Registry HTTP API v2 wire types.
//!
//! This module defines the subset of the Docker Distribution API types the
//! purge engine needs: catalog pages, tag lists, and just enough of the
//! schema-1 manifest to extract an image creation timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media types used when talking to the registry.
pub struct MediaType;

impl MediaType {
    /// Docker image manifest schema 1 (signed) media type. Schema 1 carries
    /// the `v1Compatibility` history entries the creation timestamp lives in.
    pub const MANIFEST_V1: &'static str = "application/vnd.docker.distribution.manifest.v1+prettyjws";

    /// Docker image manifest schema 2 media type. Used when resolving a
    /// tag's content digest for deletion.
    pub const MANIFEST_V2: &'static str = "application/vnd.docker.distribution.manifest.v2+json";
}

/// One page of the repository catalog (`GET /v2/_catalog`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Repository names in this page, in registry order.
    #[serde(default)]
    pub repositories: Vec<String>,
}

/// Tag listing for one repository (`GET /v2/{name}/tags/list`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagList {
    /// Repository name.
    pub name: String,

    /// Tag names. `null` in the wire format when the repository has no
    /// tags left.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TagList {
    /// Returns the tags, treating a `null` list as empty.
    #[must_use]
    pub fn into_tags(self) -> Vec<String> {
        self.tags.unwrap_or_default()
    }
}

/// The parts of a schema-1 manifest the engine reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestV1 {
    /// Layer history, newest layer first. Entry 0 describes the image
    /// configuration, including its creation time.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl ManifestV1 {
    /// Extracts the image creation timestamp from the manifest, if present.
    ///
    /// The timestamp lives inside the `v1Compatibility` field of the first
    /// history entry, which is itself a JSON document. Any missing or
    /// malformed layer of this nesting yields `None`: an image without
    /// usable metadata is skipped, not an error.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let compat = self.history.first()?;
        let parsed: V1Compatibility = serde_json::from_str(&compat.v1_compatibility).ok()?;
        parsed.created
    }
}

/// One entry of a schema-1 manifest's history list.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    /// Embedded JSON document with the v1 image configuration.
    #[serde(rename = "v1Compatibility", default)]
    pub v1_compatibility: String,
}

/// The fields of the embedded v1 image configuration the engine reads.
#[derive(Debug, Clone, Deserialize)]
struct V1Compatibility {
    /// Image creation time.
    #[serde(default)]
    created: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_list_null_tags() {
        let list: TagList = serde_json::from_str(r#"{"name":"nginx","tags":null}"#).unwrap();
        assert!(list.into_tags().is_empty());
    }

    #[test]
    fn test_tag_list_with_tags() {
        let list: TagList =
            serde_json::from_str(r#"{"name":"nginx","tags":["v1","v2"]}"#).unwrap();
        assert_eq!(list.into_tags(), vec!["v1", "v2"]);
    }

    #[test]
    fn test_catalog_page() {
        let page: CatalogPage =
            serde_json::from_str(r#"{"repositories":["nginx","team-a/api"]}"#).unwrap();
        assert_eq!(page.repositories, vec!["nginx", "team-a/api"]);
    }

    #[test]
    fn test_manifest_created_at() {
        let manifest: ManifestV1 = serde_json::from_str(
            r#"{
                "history": [
                    {"v1Compatibility": "{\"created\":\"2026-01-05T10:00:00Z\"}"},
                    {"v1Compatibility": "{\"created\":\"2025-12-01T00:00:00Z\"}"}
                ]
            }"#,
        )
        .unwrap();

        let created = manifest.created_at().unwrap();
        assert_eq!(created.to_rfc3339(), "2026-01-05T10:00:00+00:00");
    }

    #[test]
    fn test_manifest_without_history() {
        let manifest: ManifestV1 = serde_json::from_str("{}").unwrap();
        assert!(manifest.created_at().is_none());
    }

    #[test]
    fn test_manifest_with_malformed_compatibility() {
        let manifest: ManifestV1 = serde_json::from_str(
            r#"{"history": [{"v1Compatibility": "not json"}]}"#,
        )
        .unwrap();
        assert!(manifest.created_at().is_none());
    }

    #[test]
    fn test_manifest_without_created_field() {
        let manifest: ManifestV1 = serde_json::from_str(
            r#"{"history": [{"v1Compatibility": "{\"id\":\"abc\"}"}]}"#,
        )
        .unwrap();
        assert!(manifest.created_at().is_none());
    }
}
