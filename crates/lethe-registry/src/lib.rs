//! # Lethe Registry
//!
//! Docker Registry HTTP API v2 client for the Lethe tag retention engine.
//!
//! This crate provides the I/O collaborator the purge engine drives:
//!
//! - [`RegistryClient`] - catalog enumeration, tag listing, creation
//!   timestamp lookup, and digest-resolving tag deletion
//! - [`RegistryConfig`] / [`RegistryAuth`] / [`TlsConfig`] - connection,
//!   authentication, and TLS settings
//! - [`oci`] - the wire types for the registry API subset in use
//!
//! ## Example
//!
//! ```no_run
//! use lethe_registry::{RegistryAuth, RegistryClient, RegistryConfig};
//!
//! # async fn example() -> Result<(), lethe_registry::RegistryError> {
//! let config = RegistryConfig::new("https://registry.example.com")
//!     .with_auth(RegistryAuth::basic("ci", "secret"));
//! let client = RegistryClient::new(config)?;
//!
//! for (namespace, repos) in client.list_repositories().await? {
//!     println!("{namespace}: {} repositories", repos.len());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod oci;

// Re-export main types at crate root
pub use client::RegistryClient;
pub use config::{RegistryAuth, RegistryConfig, TlsConfig};
pub use error::RegistryError;
