use integration_tests::{PrometheusMock, TestServer, resolve_config};
use serde_json::json;

fn labels() -> PrometheusMock {
    PrometheusMock::new().success("/api/v1/labels", json!(["job"]))
}

#[tokio::test]
async fn no_credentials() {
    let prometheus = labels().spawn().await;
    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    mcp_client.call_tool("list_labels", json!({})).await;

    let request = prometheus.single_request();

    assert_eq!(request.header("authorization"), None);
    assert_eq!(request.header("x-scope-orgid"), None);
    assert!(request.header("user-agent").unwrap().starts_with("prometheus-mcp-server/"));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn basic_auth() {
    let prometheus = labels().spawn().await;

    let config = resolve_config(
        &prometheus.url,
        &[("PROMETHEUS_USERNAME", "admin"), ("PROMETHEUS_PASSWORD", "hunter2")],
    );

    let server = TestServer::start(config).await;
    let mcp_client = server.mcp_client().await;

    mcp_client.call_tool("list_labels", json!({})).await;

    let request = prometheus.single_request();
    insta::assert_snapshot!(request.header("authorization").unwrap(), @"Basic YWRtaW46aHVudGVyMg==");

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn bearer_token_wins_over_basic_auth() {
    let prometheus = labels().spawn().await;

    let config = resolve_config(
        &prometheus.url,
        &[
            ("PROMETHEUS_USERNAME", "admin"),
            ("PROMETHEUS_PASSWORD", "hunter2"),
            ("PROMETHEUS_TOKEN", "secret-token"),
        ],
    );

    let server = TestServer::start(config).await;
    let mcp_client = server.mcp_client().await;

    mcp_client.call_tool("list_labels", json!({})).await;

    let request = prometheus.single_request();
    insta::assert_snapshot!(request.header("authorization").unwrap(), @"Bearer secret-token");

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn org_id_on_every_request() {
    let prometheus = labels()
        .success("/api/v1/targets", json!({ "activeTargets": [], "droppedTargets": [] }))
        .spawn()
        .await;

    let config = resolve_config(&prometheus.url, &[("ORG_ID", "tenant-1")]);
    let server = TestServer::start(config).await;
    let mcp_client = server.mcp_client().await;

    mcp_client.call_tool("list_labels", json!({})).await;
    mcp_client.call_tool("get_targets", json!({})).await;

    let requests = prometheus.requests();
    assert_eq!(requests.len(), 2);

    for request in requests {
        assert_eq!(request.header("X-Scope-OrgID"), Some("tenant-1"), "{}", request.path);
    }

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn base_url_with_sub_path() {
    let prometheus = PrometheusMock::new()
        .success("/prometheus/api/v1/labels", json!(["job"]))
        .spawn()
        .await;

    let url = format!("{}/prometheus", prometheus.url);
    let server = TestServer::start(resolve_config(&url, &[])).await;
    let mcp_client = server.mcp_client().await;

    mcp_client.call_tool("list_labels", json!({})).await;

    assert_eq!(prometheus.single_request().path, "/prometheus/api/v1/labels");

    mcp_client.disconnect().await;
}
