use std::sync::Arc;

use config::Config;
use indoc::indoc;
use prometheus_api::{ApiError, Endpoint, PrometheusClient, QueryParam};
use rmcp::{
    RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorCode, ErrorData, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
};
use serde_json::Value;

use crate::{
    ToolError, health, shape,
    tool::{Limit, ToolKind, ToolRequest},
};

/// The MCP server handler: validates tool calls, forwards them to Prometheus and shapes the answers.
///
/// Cloning is cheap; all clones share one configuration and one HTTP client.
#[derive(Clone)]
pub struct McpServer(Arc<McpServerInner>);

struct McpServerInner {
    info: ServerInfo,
    config: Config,
    client: PrometheusClient,
}

impl McpServer {
    /// Creates the server for the given configuration.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let client = PrometheusClient::new(&config.prometheus)?;

        let server_info = Implementation {
            name: "prometheus-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        };

        let inner = McpServerInner {
            info: ServerInfo {
                protocol_version: ProtocolVersion::V_2025_03_26,
                capabilities: ServerCapabilities::builder().enable_tools().build(),
                server_info,
                instructions: Some(instructions().to_string()),
            },
            config,
            client,
        };

        Ok(Self(Arc::new(inner)))
    }

    /// Validates and executes one tool call.
    pub async fn call(&self, kind: ToolKind, arguments: Option<rmcp::model::JsonObject>) -> Result<Value, ToolError> {
        let request = ToolRequest::parse(kind, arguments)?;
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: ToolRequest) -> Result<Value, ToolError> {
        match request {
            ToolRequest::HealthCheck => Ok(health::report(&self.0.config, &self.0.client).await),
            ToolRequest::ExecuteQuery { query, time } => {
                log::info!("Executing instant query: {query}");

                let mut params: Vec<QueryParam> = vec![("query", query)];

                if let Some(time) = time {
                    params.push(("time", time.to_query_value()));
                }

                let data = self.0.client.get(Endpoint::Query, &params).await?;
                shape::query_result(data)
            }
            ToolRequest::ExecuteRangeQuery { query, start, end, step } => {
                log::info!("Executing range query: {query} from {start} to {end} every {step}");

                let params: Vec<QueryParam> = vec![
                    ("query", query),
                    ("start", start.to_query_value()),
                    ("end", end.to_query_value()),
                    ("step", step),
                ];

                let data = self.0.client.get(Endpoint::QueryRange, &params).await?;
                shape::query_result(data)
            }
            ToolRequest::ListMetrics { limit } => {
                log::info!("Listing available metrics");

                let data = self.0.client.get(Endpoint::MetricNames, &limit_params(limit)).await?;
                Ok(Value::Array(limit.apply(shape::list(data)?)))
            }
            ToolRequest::GetMetricMetadata { metric, limit } => {
                log::info!("Retrieving metadata for metric {metric}");

                let mut params = limit_params(limit);
                params.push(("metric", metric));

                let data = self.0.client.get(Endpoint::Metadata, &params).await?;
                Ok(Value::Array(limit.apply(shape::metadata(data)?)))
            }
            ToolRequest::GetTargets => {
                log::info!("Retrieving scrape targets");

                let data = self.0.client.get(Endpoint::Targets, &[]).await?;
                shape::targets(data)
            }
            ToolRequest::ListLabels { limit } => {
                log::info!("Listing label names");

                let data = self.0.client.get(Endpoint::Labels, &limit_params(limit)).await?;
                Ok(Value::Array(limit.apply(shape::list(data)?)))
            }
            ToolRequest::GetLabelValues { label_name, limit } => {
                log::info!("Listing values of label {label_name}");

                let endpoint = Endpoint::LabelValues(&label_name);
                let data = self.0.client.get(endpoint, &limit_params(limit)).await?;

                Ok(Value::Array(limit.apply(shape::list(data)?)))
            }
            ToolRequest::FindSeries {
                matchers,
                start,
                end,
                limit,
            } => {
                log::info!("Finding series for {} selector(s)", matchers.len());

                let mut params: Vec<QueryParam> = matchers.into_iter().map(|matcher| ("match[]", matcher)).collect();

                if let Some(start) = start {
                    params.push(("start", start.to_query_value()));
                }

                if let Some(end) = end {
                    params.push(("end", end.to_query_value()));
                }

                params.extend(limit_params(limit));

                let data = self.0.client.get(Endpoint::Series, &params).await?;
                Ok(Value::Array(limit.apply(shape::list(data)?)))
            }
        }
    }
}

/// Positive limits are forwarded; servers that support `limit` then send less.
fn limit_params(limit: Limit) -> Vec<QueryParam> {
    limit
        .get()
        .map(|limit| ("limit", limit.to_string()))
        .into_iter()
        .collect()
}

fn encode(value: Value) -> Result<CallToolResult, ErrorData> {
    match value {
        Value::Object(_) => Ok(CallToolResult::structured(value)),
        other => Ok(CallToolResult::success(vec![Content::json(other)?])),
    }
}

fn result_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(object) => match object.get("result") {
            Some(Value::Array(result)) => result.len(),
            _ => 1,
        },
        _ => 1,
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        self.0.info.clone()
    }

    async fn list_tools(
        &self,
        _: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: ToolKind::ALL.into_iter().map(ToolKind::to_tool).collect(),
        })
    }

    async fn call_tool(
        &self,
        CallToolRequestParam { name, arguments }: CallToolRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let Some(kind) = ToolKind::from_name(&name) else {
            log::warn!("Rejected call to unknown tool '{name}'");

            return Err(ErrorData::new(
                ErrorCode::INVALID_PARAMS,
                format!("Unknown tool '{name}'"),
                None,
            ));
        };

        match self.call(kind, arguments).await {
            Ok(value) => {
                log::info!("Tool {kind} completed with {} result(s)", result_count(&value));
                encode(value)
            }
            Err(error) => {
                log::log!(failure_level(&error), "Tool {kind} failed: {error}");
                Err(error.into())
            }
        }
    }
}

/// Upstream API failures are already logged by the client that classified them.
fn failure_level(error: &ToolError) -> log::Level {
    match error {
        ToolError::Api(_) => log::Level::Debug,
        ToolError::UnexpectedResponse(_) => log::Level::Error,
        _ => log::Level::Warn,
    }
}

fn instructions() -> &'static str {
    indoc! {r#"
        This server gives access to a Prometheus-compatible monitoring backend.

        **Instructions:**
        1.  **Discover:** use `list_metrics`, `list_labels`, `get_label_values` and `find_series`
            to learn which metrics and label values exist. Pass `limit` to keep large answers small.
        2.  **Understand:** use `get_metric_metadata` to read the type, help text and unit of a metric.
        3.  **Query:** use `execute_query` for a single point in time and `execute_range_query` for a
            window. Times are RFC3339 strings or Unix timestamps.
        4.  **Troubleshoot:** use `get_targets` to inspect scrape targets and `health_check` to verify
            that Prometheus is reachable.

        Results are returned as Prometheus produced them. Query errors carry the Prometheus
        `errorType` and `error` fields unchanged.
    "#}
}
