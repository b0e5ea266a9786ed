//! Error types for Lethe core operations.
//!
//! This module defines the error types used throughout the `lethe-core` crate.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Lethe core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A rule pattern failed to compile as a regular expression.
    ///
    /// Resolution surfaces this so the orchestrator can abort the
    /// repository currently being evaluated and carry on with the rest
    /// of the catalog.
    #[error("Invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// Policy configuration is structurally invalid.
    #[error("Invalid policy configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
