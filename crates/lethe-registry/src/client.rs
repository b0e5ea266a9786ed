//! Docker Registry HTTP API v2 client.
//!
//! This module provides the client used by the purge engine to enumerate
//! the catalog, list tags, read image creation timestamps, and delete tags.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;

use crate::config::{RegistryAuth, RegistryConfig};
use crate::error::RegistryError;
use crate::oci::{CatalogPage, ManifestV1, MediaType, TagList};

/// Client for a Docker Registry HTTP API v2 endpoint.
#[derive(Debug)]
pub struct RegistryClient {
    config: RegistryConfig,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Creates a new registry client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lethe_registry::{RegistryClient, RegistryConfig};
    ///
    /// let config = RegistryConfig::new("https://registry.example.com");
    /// let client = RegistryClient::new(config)?;
    /// # Ok::<(), lethe_registry::RegistryError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http = Self::build_http_client(&config)?;
        Ok(Self { config, http })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Enumerates the full repository catalog, grouped by namespace.
    ///
    /// Pages through `GET /v2/_catalog`. A repository name with a `/` is
    /// split into `namespace/name` on the first separator; bare names fall
    /// under the configured default namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be retrieved.
    pub async fn list_repositories(
        &self,
    ) -> Result<BTreeMap<String, Vec<String>>, RegistryError> {
        let mut catalog: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let page_size = self.config.catalog_page_size;
        let mut last: Option<String> = None;

        loop {
            let url = last.as_ref().map_or_else(
                || format!("{}/v2/_catalog?n={page_size}", self.config.url),
                |last| format!("{}/v2/_catalog?n={page_size}&last={last}", self.config.url),
            );

            let response = self
                .http
                .get(&url)
                .headers(self.auth_headers()?)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(RegistryError::HttpError {
                    status: response.status().as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }

            let page: CatalogPage = response.json().await?;
            let page_len = page.repositories.len();
            last = page.repositories.last().cloned();

            for full_name in page.repositories {
                let (namespace, name) = full_name.split_once('/').map_or_else(
                    || (self.config.default_namespace.clone(), full_name.clone()),
                    |(ns, rest)| (ns.to_string(), rest.to_string()),
                );
                catalog.entry(namespace).or_default().push(name);
            }

            if page_len < page_size {
                break;
            }
        }

        tracing::debug!(
            namespaces = catalog.len(),
            "Enumerated registry catalog"
        );
        Ok(catalog)
    }

    /// Lists all tags for a repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - Full repository name.
    ///
    /// # Errors
    ///
    /// Returns an error if the tags cannot be retrieved. A missing
    /// repository (404) yields an empty list.
    pub async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/v2/{repository}/tags/list", self.config.url);

        let response = self
            .http
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        if !response.status().is_success() {
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(Vec::new());
            }
            return Err(RegistryError::HttpError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let tag_list: TagList = response.json().await?;
        Ok(tag_list.into_tags())
    }

    /// Reads a tag's image creation timestamp from its schema-1 manifest.
    ///
    /// # Arguments
    ///
    /// * `repository` - Full repository name.
    /// * `tag` - Tag name.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the manifest is missing or carries no usable
    /// creation metadata; this is a recoverable skip for the caller, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be contacted or rejects the
    /// request with a non-404 status.
    pub async fn tag_created_at(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>, RegistryError> {
        let url = format!("{}/v2/{repository}/manifests/{tag}", self.config.url);

        let response = self
            .http
            .get(&url)
            .headers(self.auth_headers()?)
            .header(ACCEPT, MediaType::MANIFEST_V1)
            .send()
            .await?;

        if !response.status().is_success() {
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            return Err(RegistryError::HttpError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        // Schema-1 responses are signed JWS documents but still parse as
        // plain JSON for the fields we read.
        let manifest: ManifestV1 = response.json().await?;
        Ok(manifest.created_at())
    }

    /// Deletes a tag by resolving its content digest and deleting the
    /// manifest.
    ///
    /// The registry API has no tag-level delete: the schema-2 digest is
    /// resolved with a HEAD request and the manifest is deleted by digest,
    /// which drops every tag pointing at it.
    ///
    /// # Arguments
    ///
    /// * `repository` - Full repository name.
    /// * `tag` - Tag name.
    ///
    /// # Errors
    ///
    /// Returns an error if the digest cannot be resolved or the delete is
    /// rejected.
    pub async fn delete_tag(&self, repository: &str, tag: &str) -> Result<(), RegistryError> {
        let digest = self.resolve_digest(repository, tag).await?;
        let url = format!("{}/v2/{repository}/manifests/{digest}", self.config.url);

        let response = self
            .http
            .delete(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        if !response.status().is_success() && response.status().as_u16() != 202 {
            return Err(RegistryError::DeleteFailed {
                repository: repository.to_string(),
                tag: tag.to_string(),
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        tracing::debug!(repository, tag, %digest, "Deleted manifest");
        Ok(())
    }

    /// Resolves the schema-2 content digest for a tag.
    async fn resolve_digest(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<String, RegistryError> {
        let url = format!("{}/v2/{repository}/manifests/{tag}", self.config.url);

        let response = self
            .http
            .head(&url)
            .headers(self.auth_headers()?)
            .header(ACCEPT, MediaType::MANIFEST_V2)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::ManifestNotFound {
                repository: repository.to_string(),
                tag: tag.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(RegistryError::HttpError {
                status: response.status().as_u16(),
                message: String::new(),
            });
        }

        response
            .headers()
            .get("docker-content-digest")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| RegistryError::MissingDigest {
                repository: repository.to_string(),
                tag: tag.to_string(),
            })
    }

    /// Builds the HTTP client with proper configuration.
    fn build_http_client(config: &RegistryConfig) -> Result<reqwest::Client, RegistryError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent);

        if let Some(ref tls) = config.tls {
            if tls.insecure_skip_verify {
                builder = builder.danger_accept_invalid_certs(true);
            }

            if let Some(ref ca_cert) = tls.ca_cert {
                let cert_pem = std::fs::read(ca_cert).map_err(|e| RegistryError::IoError {
                    path: ca_cert.clone(),
                    source: e,
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem).map_err(|e| {
                    RegistryError::InvalidTls {
                        message: format!("Invalid CA certificate: {e}"),
                    }
                })?;
                builder = builder.add_root_certificate(cert);
            }

            if let (Some(ref cert_path), Some(ref key_path)) = (&tls.client_cert, &tls.client_key)
            {
                let mut cert_pem = std::fs::read(cert_path).map_err(|e| RegistryError::IoError {
                    path: cert_path.clone(),
                    source: e,
                })?;
                let key_pem = std::fs::read(key_path).map_err(|e| RegistryError::IoError {
                    path: key_path.clone(),
                    source: e,
                })?;
                cert_pem.extend_from_slice(&key_pem);

                let identity = reqwest::Identity::from_pem(&cert_pem).map_err(|e| {
                    RegistryError::InvalidTls {
                        message: format!("Invalid client certificate: {e}"),
                    }
                })?;
                builder = builder.identity(identity);
            }
        }

        builder.build().map_err(|e| RegistryError::ConnectionFailed {
            url: config.url.clone(),
            source: e,
        })
    }

    /// Creates authentication headers based on configuration.
    fn auth_headers(&self) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();

        match &self.config.auth {
            RegistryAuth::None => {}
            RegistryAuth::Basic { username, password } => {
                let credentials = base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    format!("{username}:{password}"),
                );
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
                        RegistryError::AuthenticationFailed {
                            message: "Invalid credentials".to_string(),
                        }
                    })?,
                );
            }
            RegistryAuth::Bearer { token } => {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                        RegistryError::AuthenticationFailed {
                            message: "Invalid token".to_string(),
                        }
                    })?,
                );
            }
        }

        Ok(headers)
    }
}
