use thiserror::Error;

/// Errors raised while resolving the configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `PROMETHEUS_URL` was not provided.
    #[error(
        "PROMETHEUS_URL environment variable is not set. Set it to your Prometheus server URL, e.g. http://your-prometheus-server:9090"
    )]
    MissingUrl,

    /// `PROMETHEUS_URL` could not be parsed.
    #[error("PROMETHEUS_URL '{value}' is not a valid URL: {reason}")]
    InvalidUrl {
        /// The rejected value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// `PROMETHEUS_URL` uses a scheme other than http or https.
    #[error("PROMETHEUS_URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    /// Only one half of the basic auth pair was provided.
    #[error("{present} is set but {missing} is missing; basic auth needs both")]
    IncompleteBasicAuth {
        /// The variable that was set.
        present: &'static str,
        /// The variable that was not.
        missing: &'static str,
    },

    /// `ORG_ID` cannot be sent as a header value.
    #[error("ORG_ID is not a valid HTTP header value")]
    InvalidOrgId,

    /// `PROMETHEUS_TOKEN` cannot be sent in an `Authorization` header.
    #[error("PROMETHEUS_TOKEN is not a valid HTTP header value; check it for stray whitespace or line breaks")]
    InvalidToken,

    /// `PROMETHEUS_MCP_SERVER_TRANSPORT` is not a recognized transport.
    #[error("PROMETHEUS_MCP_SERVER_TRANSPORT must be one of stdio, http, sse; got '{0}'")]
    InvalidTransport(String),

    /// `PROMETHEUS_MCP_BIND_PORT` is not a valid port number.
    #[error("PROMETHEUS_MCP_BIND_PORT must be an integer between 0 and 65535, got '{0}'")]
    InvalidPort(String),

    /// `PROMETHEUS_REQUEST_TIMEOUT` is not a valid duration.
    #[error("PROMETHEUS_REQUEST_TIMEOUT '{value}' is not a valid duration: {reason}")]
    InvalidTimeout {
        /// The rejected value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
}
