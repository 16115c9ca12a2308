//! Upstream Prometheus connection settings.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Connection settings for the Prometheus-compatible upstream.
#[derive(Debug, Clone)]
pub struct PrometheusConfig {
    /// Base URL of the upstream, e.g. `http://prometheus:9090`. API paths are appended to it.
    pub url: Url,
    /// Authentication sent with every request.
    pub auth: Auth,
    /// Tenant id for multi-tenant backends (Cortex, Mimir, Thanos).
    pub org_id: Option<String>,
    /// Timeout for a single upstream request.
    pub timeout: Duration,
}

/// Authentication mode for upstream requests. Exactly one is active.
#[derive(Debug, Clone, Default)]
pub enum Auth {
    /// No authentication header.
    #[default]
    None,
    /// HTTP basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: SecretString,
    },
    /// Bearer token authentication.
    Bearer {
        /// The token, sent as `Authorization: Bearer <token>`.
        token: SecretString,
    },
}

impl Auth {
    /// A short name of the authentication method, safe to log.
    pub fn method(&self) -> &'static str {
        match self {
            Auth::None => "none",
            Auth::Basic { .. } => "basic_auth",
            Auth::Bearer { .. } => "bearer_token",
        }
    }

    /// Whether any credentials are configured.
    pub fn is_configured(&self) -> bool {
        !matches!(self, Auth::None)
    }
}
