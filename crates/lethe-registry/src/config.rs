//! Configuration types for the registry client.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry URL (e.g., "<https://registry.example.com>").
    pub url: String,

    /// Namespace under which bare repository names live. Repositories in
    /// this namespace are addressed without the namespace prefix.
    pub default_namespace: String,

    /// Authentication configuration.
    pub auth: RegistryAuth,

    /// Request timeout.
    pub timeout: Duration,

    /// Catalog page size for repository enumeration.
    pub catalog_page_size: usize,

    /// TLS configuration for private registries.
    pub tls: Option<TlsConfig>,

    /// User agent string.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use lethe_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://registry.example.com");
    /// assert_eq!(config.url, "https://registry.example.com");
    /// assert_eq!(config.default_namespace, "library");
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            default_namespace: "library".to_string(),
            auth: RegistryAuth::None,
            timeout: Duration::from_secs(30),
            catalog_page_size: 1000,
            tls: None,
            user_agent: format!("lethe-registry/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the default namespace.
    #[must_use]
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the catalog page size.
    #[must_use]
    pub const fn with_catalog_page_size(mut self, size: usize) -> Self {
        self.catalog_page_size = size;
        self
    }

    /// Sets the TLS configuration.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Returns the full repository name for a namespace/name pair.
    ///
    /// Repositories in the default namespace are addressed bare.
    ///
    /// # Examples
    ///
    /// ```
    /// use lethe_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://registry.example.com");
    /// assert_eq!(config.full_repo_name("library", "nginx"), "nginx");
    /// assert_eq!(config.full_repo_name("team-a", "nginx"), "team-a/nginx");
    /// ```
    #[must_use]
    pub fn full_repo_name(&self, namespace: &str, name: &str) -> String {
        if namespace == self.default_namespace {
            name.to_string()
        } else {
            format!("{namespace}/{name}")
        }
    }
}

/// Authentication methods for registry access.
#[derive(Debug, Clone)]
pub enum RegistryAuth {
    /// No authentication (for local development).
    None,

    /// Basic authentication (username/password or username/token).
    Basic {
        /// Username.
        username: String,
        /// Password or token.
        password: String,
    },

    /// Bearer token authentication.
    Bearer {
        /// Token value.
        token: String,
    },
}

impl RegistryAuth {
    /// Creates basic authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use lethe_registry::RegistryAuth;
    ///
    /// let auth = RegistryAuth::basic("user", "pass");
    /// ```
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates bearer token authentication.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }
}

/// TLS configuration for connections to private registries.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Path to CA certificate file.
    pub ca_cert: Option<PathBuf>,

    /// Path to client certificate file.
    pub client_cert: Option<PathBuf>,

    /// Path to client private key file.
    pub client_key: Option<PathBuf>,

    /// Whether to skip certificate verification (NOT recommended for
    /// production).
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    /// Creates a new TLS configuration with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ca_cert: None,
            client_cert: None,
            client_key: None,
            insecure_skip_verify: false,
        }
    }

    /// Sets the CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Sets client certificate and key paths for mTLS.
    #[must_use]
    pub fn with_client_cert(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.client_cert = Some(cert.into());
        self.client_key = Some(key.into());
        self
    }

    /// Enables insecure mode (skips certificate verification).
    ///
    /// # Warning
    ///
    /// This should only be used for testing. Never use in production.
    #[must_use]
    pub const fn insecure(mut self) -> Self {
        self.insecure_skip_verify = true;
        self
    }
}
