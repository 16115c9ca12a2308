use std::time::Duration;

use integration_tests::{PrometheusMock, TestServer, resolve_config};
use rmcp::model::ErrorCode;
use serde_json::json;

#[tokio::test]
async fn query_error_is_passed_through() {
    let body = json!({
        "status": "error",
        "errorType": "bad_data",
        "error": "invalid parameter \"query\": 1:5: parse error: unexpected end of input"
    });

    let prometheus = PrometheusMock::new()
        .respond("/api/v1/query", 400, body.to_string())
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let error = mcp_client.call_tool_error("execute_query", json!({ "query": "sum(" })).await;

    assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
    insta::assert_snapshot!(error.message, @r#"Prometheus API error (bad_data): invalid parameter "query": 1:5: parse error: unexpected end of input"#);
    insta::assert_json_snapshot!(error.data, @r#"
    {
      "kind": "query",
      "status": 400,
      "errorType": "bad_data",
      "error": "invalid parameter \"query\": 1:5: parse error: unexpected end of input"
    }
    "#);

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn non_envelope_body_is_protocol_error() {
    let prometheus = PrometheusMock::new()
        .respond("/api/v1/targets", 502, "<html><body>Bad Gateway</body></html>")
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let error = mcp_client.call_tool_error("get_targets", json!({})).await;

    assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
    insta::assert_snapshot!(error.message, @"HTTP 502 error from Prometheus server");
    insta::assert_json_snapshot!(error.data, @r#"
    {
      "kind": "protocol",
      "status": 502
    }
    "#);

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn unauthorized() {
    let prometheus = PrometheusMock::new()
        .respond("/api/v1/labels", 401, "Unauthorized")
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let error = mcp_client.call_tool_error("list_labels", json!({})).await;

    insta::assert_snapshot!(error.message, @"Authentication failed (HTTP 401). Please check your Prometheus credentials.");
    assert_eq!(error.data, Some(json!({ "kind": "protocol", "status": 401 })));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn unexpected_data_shape() {
    let prometheus = PrometheusMock::new()
        .success("/api/v1/labels", json!({ "not": "a list" }))
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let error = mcp_client.call_tool_error("list_labels", json!({})).await;

    assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
    assert_eq!(error.data, Some(json!({ "kind": "protocol" })));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn unreachable_upstream() {
    // Bind and release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let server = TestServer::start(resolve_config(&format!("http://{address}"), &[])).await;
    let mcp_client = server.mcp_client().await;

    let error = mcp_client.call_tool_error("list_metrics", json!({})).await;

    assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
    assert!(error.message.starts_with("Cannot connect to Prometheus server at"), "{}", error.message);
    assert_eq!(error.data, Some(json!({ "kind": "transport", "reason": "unreachable" })));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn upstream_timeout() {
    let prometheus = PrometheusMock::new()
        .success("/api/v1/query", json!({ "resultType": "vector", "result": [] }))
        .delay(Duration::from_secs(5))
        .spawn()
        .await;

    let config = resolve_config(&prometheus.url, &[("PROMETHEUS_REQUEST_TIMEOUT", "200ms")]);
    let server = TestServer::start(config).await;
    let mcp_client = server.mcp_client().await;

    let error = mcp_client.call_tool_error("execute_query", json!({ "query": "up" })).await;

    assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
    assert!(error.message.contains("is not responding (timeout after 0.2s)"), "{}", error.message);
    assert_eq!(error.data, Some(json!({ "kind": "transport", "reason": "timeout" })));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn unknown_tool() {
    let prometheus = PrometheusMock::new().spawn().await;
    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let error = mcp_client.call_tool_error("delete_series", json!({})).await;

    assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    insta::assert_snapshot!(error.message, @"Unknown tool 'delete_series'");
    assert!(prometheus.requests().is_empty());

    mcp_client.disconnect().await;
}
