//! Raw tool arguments, as sent by the client.

use std::{
    borrow::Cow,
    num::{IntErrorKind, NonZeroUsize},
};

use prometheus_api::Timestamp;
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::Deserialize;
use serde_json::Value;

use crate::ToolError;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct NoParameters {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct ExecuteQueryParameters {
    /// PromQL query string.
    pub query: String,
    /// Evaluation time as RFC3339 or Unix timestamp. Defaults to the current server time.
    #[serde(default)]
    pub time: Option<TimeArg>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct ExecuteRangeQueryParameters {
    /// PromQL query string.
    pub query: String,
    /// Start time as RFC3339 or Unix timestamp.
    pub start: TimeArg,
    /// End time as RFC3339 or Unix timestamp.
    pub end: TimeArg,
    /// Query resolution step width, e.g. '15s', '1m', '1h', or a number of seconds.
    pub step: StepArg,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct LimitParameters {
    /// Maximum number of entries to return. Zero or absent returns everything.
    #[serde(default)]
    pub limit: Option<LimitArg>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct MetricMetadataParameters {
    /// The name of the metric to retrieve metadata for.
    pub metric: String,
    /// Maximum number of metadata entries to return. Zero or absent returns everything.
    #[serde(default)]
    pub limit: Option<LimitArg>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct LabelValuesParameters {
    /// The label name, e.g. 'job' or 'instance'.
    pub label_name: String,
    /// Maximum number of values to return. Zero or absent returns everything.
    #[serde(default)]
    pub limit: Option<LimitArg>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct FindSeriesParameters {
    /// Series selectors, e.g. ['up', 'http_requests_total{job="api"}']. At least one is required.
    #[serde(rename = "match")]
    pub matchers: Vec<String>,
    /// Start of the time window as RFC3339 or Unix timestamp.
    #[serde(default)]
    pub start: Option<TimeArg>,
    /// End of the time window as RFC3339 or Unix timestamp.
    #[serde(default)]
    pub end: Option<TimeArg>,
    /// Maximum number of series to return. Zero or absent returns everything.
    #[serde(default)]
    pub limit: Option<LimitArg>,
}

/// A point in time, given as a string or a JSON number.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct TimeArg(Value);

impl TimeArg {
    pub(crate) fn resolve(&self, parameter: &'static str) -> Result<Timestamp, ToolError> {
        let input = match &self.0 {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        };

        input
            .parse()
            .map_err(|source| ToolError::InvalidTimestamp { parameter, source })
    }
}

impl JsonSchema for TimeArg {
    fn schema_name() -> Cow<'static, str> {
        "TimeArg".into()
    }

    fn inline_schema() -> bool {
        true
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        json_schema!({ "type": "string" })
    }
}

/// A range query step: a duration string or a number of seconds.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct StepArg(Value);

impl StepArg {
    pub(crate) fn resolve(&self) -> Result<String, ToolError> {
        match &self.0 {
            Value::String(s) if s.trim().is_empty() => Err(ToolError::EmptyParameter("step")),
            Value::String(s) => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(ToolError::InvalidArguments(format!(
                "step must be a duration string or a number of seconds, got {other}"
            ))),
        }
    }
}

impl JsonSchema for StepArg {
    fn schema_name() -> Cow<'static, str> {
        "StepArg".into()
    }

    fn inline_schema() -> bool {
        true
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        json_schema!({ "type": "string" })
    }
}

/// A result limit, given as an integer or a string holding one.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct LimitArg(Value);

impl LimitArg {
    /// Returns `None` for zero and negative values, which mean "no limit".
    ///
    /// Positive values beyond `usize` saturate.
    pub(crate) fn resolve(&self) -> Result<Option<NonZeroUsize>, ToolError> {
        let parsed = match &self.0 {
            Value::Number(n) => n.as_u64().map(i128::from).or_else(|| n.as_i64().map(i128::from)),
            Value::String(s) => match s.trim().parse::<i128>() {
                Ok(limit) => Some(limit),
                Err(e) => match e.kind() {
                    IntErrorKind::PosOverflow => Some(i128::MAX),
                    IntErrorKind::NegOverflow => Some(0),
                    _ => None,
                },
            },
            _ => None,
        };

        let Some(limit) = parsed else {
            let raw = match &self.0 {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };

            return Err(ToolError::InvalidLimit(raw));
        };

        let limit = if limit <= 0 {
            0
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        };

        Ok(NonZeroUsize::new(limit))
    }
}

impl JsonSchema for LimitArg {
    fn schema_name() -> Cow<'static, str> {
        "LimitArg".into()
    }

    fn inline_schema() -> bool {
        true
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        json_schema!({ "type": "integer" })
    }
}
