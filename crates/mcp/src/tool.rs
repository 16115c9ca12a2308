mod params;
mod request;

pub(crate) use request::{Limit, ToolRequest};

use std::{fmt, sync::Arc};

use indoc::indoc;
use rmcp::model::{JsonObject, Tool, ToolAnnotations};
use schemars::{JsonSchema, Schema, generate::SchemaSettings, transform::Transform};
use serde_json::Value;

use params::{
    ExecuteQueryParameters, ExecuteRangeQueryParameters, FindSeriesParameters, LabelValuesParameters,
    LimitParameters, MetricMetadataParameters, NoParameters,
};

/// The closed set of tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// `health_check`
    HealthCheck,
    /// `execute_query`
    ExecuteQuery,
    /// `execute_range_query`
    ExecuteRangeQuery,
    /// `list_metrics`
    ListMetrics,
    /// `get_metric_metadata`
    GetMetricMetadata,
    /// `get_targets`
    GetTargets,
    /// `list_labels`
    ListLabels,
    /// `get_label_values`
    GetLabelValues,
    /// `find_series`
    FindSeries,
}

impl ToolKind {
    /// Every tool, in the order they are listed to clients.
    pub const ALL: [ToolKind; 9] = [
        ToolKind::HealthCheck,
        ToolKind::ExecuteQuery,
        ToolKind::ExecuteRangeQuery,
        ToolKind::ListMetrics,
        ToolKind::GetMetricMetadata,
        ToolKind::GetTargets,
        ToolKind::ListLabels,
        ToolKind::GetLabelValues,
        ToolKind::FindSeries,
    ];

    /// The MCP tool name.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::HealthCheck => "health_check",
            ToolKind::ExecuteQuery => "execute_query",
            ToolKind::ExecuteRangeQuery => "execute_range_query",
            ToolKind::ListMetrics => "list_metrics",
            ToolKind::GetMetricMetadata => "get_metric_metadata",
            ToolKind::GetTargets => "get_targets",
            ToolKind::ListLabels => "list_labels",
            ToolKind::GetLabelValues => "get_label_values",
            ToolKind::FindSeries => "find_series",
        }
    }

    /// Looks a tool up by its MCP name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub(crate) fn required_parameters(self) -> &'static [&'static str] {
        match self {
            ToolKind::HealthCheck | ToolKind::GetTargets | ToolKind::ListMetrics | ToolKind::ListLabels => &[],
            ToolKind::ExecuteQuery => &["query"],
            ToolKind::ExecuteRangeQuery => &["query", "start", "end", "step"],
            ToolKind::GetMetricMetadata => &["metric"],
            ToolKind::GetLabelValues => &["label_name"],
            ToolKind::FindSeries => &["match"],
        }
    }

    fn description(self) -> &'static str {
        match self {
            ToolKind::HealthCheck => indoc! {"
                Health check for container monitoring and status verification. Reports the server
                configuration and whether Prometheus answers a probe query.
            "},
            ToolKind::ExecuteQuery => indoc! {"
                Execute a PromQL instant query against Prometheus. Returns the result type and the
                result exactly as Prometheus computed it.
            "},
            ToolKind::ExecuteRangeQuery => indoc! {"
                Execute a PromQL range query with start time, end time, and step interval. Returns
                the result type and the result, usually a matrix.
            "},
            ToolKind::ListMetrics => indoc! {"
                List all available metric names in Prometheus, in the order Prometheus returns them.
            "},
            ToolKind::GetMetricMetadata => indoc! {"
                Get metadata (type, help text and unit) for a specific metric.
            "},
            ToolKind::GetTargets => indoc! {"
                Get information about all scrape targets, both active and dropped.
            "},
            ToolKind::ListLabels => indoc! {"
                List all label names known to Prometheus.
            "},
            ToolKind::GetLabelValues => indoc! {"
                List the values of a label, e.g. every 'job' or every 'instance'.
            "},
            ToolKind::FindSeries => indoc! {"
                Find the time series matching one or more series selectors. Returns the label set
                of every matching series.
            "},
        }
    }

    fn input_schema(self) -> JsonObject {
        match self {
            ToolKind::HealthCheck | ToolKind::GetTargets => schema_for::<NoParameters>(),
            ToolKind::ExecuteQuery => schema_for::<ExecuteQueryParameters>(),
            ToolKind::ExecuteRangeQuery => schema_for::<ExecuteRangeQueryParameters>(),
            ToolKind::ListMetrics | ToolKind::ListLabels => schema_for::<LimitParameters>(),
            ToolKind::GetMetricMetadata => schema_for::<MetricMetadataParameters>(),
            ToolKind::GetLabelValues => schema_for::<LabelValuesParameters>(),
            ToolKind::FindSeries => schema_for::<FindSeriesParameters>(),
        }
    }

    /// The tool definition advertised in `tools/list`.
    pub fn to_tool(self) -> Tool {
        let annotations = ToolAnnotations::new().read_only(true).open_world(true);

        Tool::new(self.name(), self.description().trim_end(), Arc::new(self.input_schema())).annotate(annotations)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Removes schema fields some MCP clients reject: the `$schema` meta field and `format` hints.
/// Optional parameters are advertised with their plain type instead of a `[type, "null"]` union.
#[derive(Clone, Debug)]
struct McpCompatibilityTransform;

impl Transform for McpCompatibilityTransform {
    fn transform(&mut self, schema: &mut Schema) {
        schema.remove("$schema");
        schema.remove("format");

        if let Some(single) = non_null_type(schema) {
            schema.insert("type".to_string(), single);
        }

        schemars::transform::transform_subschemas(self, schema);
    }
}

/// The only non-null member of a `type` array that also lists `"null"`.
fn non_null_type(schema: &Schema) -> Option<Value> {
    let Some(Value::Array(types)) = schema.get("type") else {
        return None;
    };

    if !types.iter().any(|t| t == "null") {
        return None;
    }

    match types.iter().filter(|t| *t != "null").collect::<Vec<_>>().as_slice() {
        [single] => Some((*single).clone()),
        _ => None,
    }
}

fn schema_settings() -> SchemaSettings {
    let mut settings = SchemaSettings::default();
    settings.meta_schema = None;
    settings.transforms.push(Box::new(McpCompatibilityTransform));
    settings
}

fn schema_for<T: JsonSchema>() -> JsonObject {
    let schema = schema_settings().into_generator().into_root_schema_for::<T>();

    match schema.to_value() {
        Value::Object(object) => object,
        _ => {
            log::warn!("Failed to generate input schema for {}", T::schema_name());
            JsonObject::new()
        }
    }
}
