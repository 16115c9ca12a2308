//! Configuration structures for the Prometheus MCP server, resolved from the process environment.

#![deny(missing_docs)]

mod error;
mod loader;
mod prometheus;
mod server;

use std::time::Duration;

pub use error::ConfigError;
pub use loader::{
    ORG_ID, PROMETHEUS_MCP_BIND_HOST, PROMETHEUS_MCP_BIND_PORT, PROMETHEUS_MCP_SERVER_TRANSPORT, PROMETHEUS_PASSWORD,
    PROMETHEUS_REQUEST_TIMEOUT, PROMETHEUS_TOKEN, PROMETHEUS_URL, PROMETHEUS_USERNAME,
};
pub use prometheus::{Auth, PrometheusConfig};
pub use server::{ServerConfig, Transport};

/// Timeout applied to every upstream request unless `PROMETHEUS_REQUEST_TIMEOUT` overrides it.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Main configuration structure, created once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection settings for the upstream Prometheus-compatible API.
    pub prometheus: PrometheusConfig,
    /// Transport and bind settings for the MCP front-end.
    pub server: ServerConfig,
}

impl Config {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through a variable lookup function.
    ///
    /// The lookup receives an environment variable name and returns its value, if any.
    /// Empty values are treated as unset.
    pub fn resolve<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        loader::resolve(lookup)
    }
}
