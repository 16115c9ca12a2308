use prometheus_api::{ApiError, InvalidTimestamp};
use rmcp::model::{ErrorCode, ErrorData};
use serde_json::{Value, json};
use thiserror::Error;

/// Failure of a single tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A required parameter was absent or `null`.
    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// A string parameter that must carry a value was empty.
    #[error("Parameter '{0}' must not be empty")]
    EmptyParameter(&'static str),

    /// An entry of the `match` array was empty.
    #[error("Entry {0} of 'match' must be a non-empty series selector")]
    EmptySelector(usize),

    /// The `limit` parameter was not an integer.
    #[error("Invalid limit value '{0}': must be a valid integer")]
    InvalidLimit(String),

    /// A time parameter could not be parsed.
    #[error("Invalid value for '{parameter}': {source}")]
    InvalidTimestamp {
        /// Name of the parameter.
        parameter: &'static str,
        /// The parse failure.
        source: InvalidTimestamp,
    },

    /// A parameter had the wrong type or was not a parameter of the tool at all.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The upstream answered successfully, but with data of an unexpected shape.
    #[error("Unexpected response from Prometheus: {0}")]
    UnexpectedResponse(String),

    /// The upstream call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ToolError {
    /// Whether the call was rejected before reaching the upstream.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ToolError::UnexpectedResponse(_) | ToolError::Api(_))
    }

    fn parameter(&self) -> Option<&'static str> {
        match self {
            ToolError::MissingParameter(name) | ToolError::EmptyParameter(name) => Some(name),
            ToolError::InvalidTimestamp { parameter, .. } => Some(parameter),
            ToolError::EmptySelector(_) => Some("match"),
            ToolError::InvalidLimit(_) => Some("limit"),
            _ => None,
        }
    }

    fn data(&self) -> Value {
        match self {
            ToolError::UnexpectedResponse(_) => json!({ "kind": "protocol" }),
            ToolError::Api(error) => api_error_data(error),
            _ => match self.parameter() {
                Some(parameter) => json!({ "kind": "validation", "parameter": parameter }),
                None => json!({ "kind": "validation" }),
            },
        }
    }
}

fn api_error_data(error: &ApiError) -> Value {
    match error {
        ApiError::Unreachable { .. } => json!({ "kind": "transport", "reason": "unreachable" }),
        ApiError::Timeout { .. } => json!({ "kind": "transport", "reason": "timeout" }),
        ApiError::Transport { .. } => json!({ "kind": "transport", "reason": "io" }),
        ApiError::Query {
            status,
            error_type,
            error,
        } => json!({
            "kind": "query",
            "status": status,
            "errorType": error_type,
            "error": error,
        }),
        ApiError::Protocol { status } => json!({ "kind": "protocol", "status": status }),
    }
}

impl From<ToolError> for ErrorData {
    fn from(error: ToolError) -> Self {
        let code = if error.is_validation() {
            ErrorCode::INVALID_PARAMS
        } else {
            ErrorCode::INTERNAL_ERROR
        };

        ErrorData::new(code, error.to_string(), Some(error.data()))
    }
}
