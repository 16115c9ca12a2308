//! Validated tool requests.

use std::num::NonZeroUsize;

use prometheus_api::Timestamp;
use rmcp::model::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    ToolKind,
    params::{
        ExecuteQueryParameters, ExecuteRangeQueryParameters, FindSeriesParameters, LabelValuesParameters,
        LimitArg, LimitParameters, MetricMetadataParameters, NoParameters,
    },
};
use crate::ToolError;

/// Optional cap on the number of entries returned to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Limit(Option<NonZeroUsize>);

impl Limit {
    fn resolve(arg: Option<&LimitArg>) -> Result<Self, ToolError> {
        match arg {
            Some(arg) => arg.resolve().map(Limit),
            None => Ok(Limit(None)),
        }
    }

    /// Keeps the first `limit` entries, in upstream order.
    pub(crate) fn apply(self, mut items: Vec<Value>) -> Vec<Value> {
        if let Some(limit) = self.0 {
            items.truncate(limit.get());
        }

        items
    }

    pub(crate) fn get(self) -> Option<usize> {
        self.0.map(NonZeroUsize::get)
    }
}

/// A tool call whose parameters passed validation.
#[derive(Debug)]
pub(crate) enum ToolRequest {
    HealthCheck,
    ExecuteQuery {
        query: String,
        time: Option<Timestamp>,
    },
    ExecuteRangeQuery {
        query: String,
        start: Timestamp,
        end: Timestamp,
        step: String,
    },
    ListMetrics {
        limit: Limit,
    },
    GetMetricMetadata {
        metric: String,
        limit: Limit,
    },
    GetTargets,
    ListLabels {
        limit: Limit,
    },
    GetLabelValues {
        label_name: String,
        limit: Limit,
    },
    FindSeries {
        matchers: Vec<String>,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        limit: Limit,
    },
}

impl ToolRequest {
    /// Validates the arguments of a call to `kind`.
    pub(crate) fn parse(kind: ToolKind, arguments: Option<JsonObject>) -> Result<Self, ToolError> {
        let arguments = arguments.unwrap_or_default();

        for &name in kind.required_parameters() {
            if arguments.get(name).is_none_or(Value::is_null) {
                return Err(ToolError::MissingParameter(name));
            }
        }

        let arguments = Value::Object(arguments);

        let request = match kind {
            ToolKind::HealthCheck => {
                decode::<NoParameters>(arguments)?;
                ToolRequest::HealthCheck
            }
            ToolKind::ExecuteQuery => {
                let params: ExecuteQueryParameters = decode(arguments)?;

                ToolRequest::ExecuteQuery {
                    query: non_empty("query", params.query)?,
                    time: params.time.map(|time| time.resolve("time")).transpose()?,
                }
            }
            ToolKind::ExecuteRangeQuery => {
                let params: ExecuteRangeQueryParameters = decode(arguments)?;

                ToolRequest::ExecuteRangeQuery {
                    query: non_empty("query", params.query)?,
                    start: params.start.resolve("start")?,
                    end: params.end.resolve("end")?,
                    step: params.step.resolve()?,
                }
            }
            ToolKind::ListMetrics => {
                let params: LimitParameters = decode(arguments)?;

                ToolRequest::ListMetrics {
                    limit: Limit::resolve(params.limit.as_ref())?,
                }
            }
            ToolKind::GetMetricMetadata => {
                let params: MetricMetadataParameters = decode(arguments)?;

                ToolRequest::GetMetricMetadata {
                    metric: non_empty("metric", params.metric)?,
                    limit: Limit::resolve(params.limit.as_ref())?,
                }
            }
            ToolKind::GetTargets => {
                decode::<NoParameters>(arguments)?;
                ToolRequest::GetTargets
            }
            ToolKind::ListLabels => {
                let params: LimitParameters = decode(arguments)?;

                ToolRequest::ListLabels {
                    limit: Limit::resolve(params.limit.as_ref())?,
                }
            }
            ToolKind::GetLabelValues => {
                let params: LabelValuesParameters = decode(arguments)?;

                ToolRequest::GetLabelValues {
                    label_name: non_empty("label_name", params.label_name)?,
                    limit: Limit::resolve(params.limit.as_ref())?,
                }
            }
            ToolKind::FindSeries => {
                let params: FindSeriesParameters = decode(arguments)?;

                if params.matchers.is_empty() {
                    return Err(ToolError::EmptyParameter("match"));
                }

                if let Some(index) = params.matchers.iter().position(|matcher| matcher.trim().is_empty()) {
                    return Err(ToolError::EmptySelector(index));
                }

                ToolRequest::FindSeries {
                    matchers: params.matchers,
                    start: params.start.map(|start| start.resolve("start")).transpose()?,
                    end: params.end.map(|end| end.resolve("end")).transpose()?,
                    limit: Limit::resolve(params.limit.as_ref())?,
                }
            }
        };

        Ok(request)
    }
}

fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn non_empty(parameter: &'static str, value: String) -> Result<String, ToolError> {
    if value.trim().is_empty() {
        Err(ToolError::EmptyParameter(parameter))
    } else {
        Ok(value)
    }
}
