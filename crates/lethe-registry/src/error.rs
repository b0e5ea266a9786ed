//! Error types for registry operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to registry.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Authentication failed.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
    },

    /// Manifest not found for a tag.
    #[error("Manifest not found: {repository}:{tag}")]
    ManifestNotFound {
        /// Repository full name.
        repository: String,
        /// Tag name.
        tag: String,
    },

    /// Registry did not return a content digest for a manifest.
    #[error("No content digest returned for {repository}:{tag}")]
    MissingDigest {
        /// Repository full name.
        repository: String,
        /// Tag name.
        tag: String,
    },

    /// Tag deletion was rejected by the registry.
    #[error("Failed to delete {repository}:{tag}: {status} - {message}")]
    DeleteFailed {
        /// Repository full name.
        repository: String,
        /// Tag name.
        tag: String,
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// HTTP error from registry.
    #[error("HTTP error from registry: {status} - {message}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    JsonError {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error at {path}: {source}")]
    IoError {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TLS material could not be loaded into the HTTP client.
    #[error("Invalid TLS configuration: {message}")]
    InvalidTls {
        /// Error message.
        message: String,
    },
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        } else {
            let status = err.status().map_or(0, |s| s.as_u16());
            Self::HttpError {
                status,
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError { source: err }
    }
}
