use serde::Deserialize;
use serde_json::Value;

use crate::ApiError;

/// The envelope every Prometheus API response is wrapped in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

/// A successful response, stripped of its envelope.
#[derive(Debug)]
pub(crate) struct Success {
    pub data: Value,
    pub warnings: Vec<String>,
}

/// Classifies a response body by its HTTP status and envelope.
///
/// Any parseable error envelope becomes [`ApiError::Query`], whatever the status code. Bodies
/// that are not an envelope at all become [`ApiError::Protocol`] carrying only the status.
pub(crate) fn parse(status: u16, body: &str) -> Result<Success, ApiError> {
    let Ok(envelope) = serde_json::from_str::<Envelope>(body) else {
        return Err(ApiError::Protocol { status });
    };

    let is_success = (200..300).contains(&status);

    match envelope.status.as_str() {
        "success" if is_success => match envelope.data {
            Some(data) => Ok(Success {
                data,
                warnings: envelope.warnings,
            }),
            None => Err(ApiError::Protocol { status }),
        },
        "error" => Err(ApiError::Query {
            status,
            error_type: envelope.error_type.unwrap_or_else(|| "unknown".to_string()),
            error: envelope.error.unwrap_or_else(|| "Unknown error".to_string()),
        }),
        _ => Err(ApiError::Protocol { status }),
    }
}
