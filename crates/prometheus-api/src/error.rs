use std::time::Duration;

use thiserror::Error;

/// Failures of a single upstream call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The upstream could not be reached (connection refused, DNS failure, TLS failure).
    #[error("Cannot connect to Prometheus server at {url}: {message}")]
    Unreachable {
        /// The URL that was requested.
        url: String,
        /// The underlying connection error.
        message: String,
    },

    /// The upstream did not answer within the configured timeout.
    #[error("Prometheus server at {url} is not responding (timeout after {}s)", .timeout.as_secs_f64())]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// Any other transport-level failure.
    #[error("Request to Prometheus failed: {message}")]
    Transport {
        /// The underlying error.
        message: String,
    },

    /// The upstream answered with a Prometheus error envelope.
    #[error("Prometheus API error ({error_type}): {error}")]
    Query {
        /// HTTP status code of the response.
        status: u16,
        /// The `errorType` field, e.g. `bad_data`.
        error_type: String,
        /// The `error` field.
        error: String,
    },

    /// The upstream answered with a body that is not a Prometheus envelope.
    #[error("{}", protocol_message(.status))]
    Protocol {
        /// HTTP status code of the response.
        status: u16,
    },
}

impl ApiError {
    /// A short name of the error kind: `transport`, `query` or `protocol`.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unreachable { .. } | ApiError::Timeout { .. } | ApiError::Transport { .. } => "transport",
            ApiError::Query { .. } => "query",
            ApiError::Protocol { .. } => "protocol",
        }
    }

    /// The HTTP status code returned by the upstream, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Query { status, .. } | ApiError::Protocol { status } => Some(*status),
            _ => None,
        }
    }
}

fn protocol_message(status: &u16) -> String {
    match *status {
        401 => "Authentication failed (HTTP 401). Please check your Prometheus credentials.".to_string(),
        403 => "Access forbidden (HTTP 403). Please check your Prometheus permissions.".to_string(),
        status => format!("HTTP {status} error from Prometheus server"),
    }
}
