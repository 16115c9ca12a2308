use integration_tests::{PrometheusMock, TestServer, payload, resolve_config};
use serde_json::json;

#[tokio::test]
async fn execute_query() {
    let data = json!({
        "resultType": "vector",
        "result": [{ "metric": { "__name__": "up" }, "value": [1617898448.214, "1"] }]
    });

    let prometheus = PrometheusMock::new().success("/api/v1/query", data).spawn().await;
    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client.call_tool("execute_query", json!({ "query": "up" })).await;

    insta::assert_json_snapshot!(payload(&result), @r#"
    {
      "resultType": "vector",
      "result": [
        {
          "metric": {
            "__name__": "up"
          },
          "value": [
            1617898448.214,
            "1"
          ]
        }
      ]
    }
    "#);

    let request = prometheus.single_request();

    assert_eq!(request.path, "/api/v1/query");
    assert_eq!(request.param("query"), Some("up"));
    assert_eq!(request.param("time"), None);

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn execute_query_at_time() {
    let data = json!({ "resultType": "scalar", "result": [1672531200, "1"] });

    let prometheus = PrometheusMock::new().success("/api/v1/query", data).spawn().await;
    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    mcp_client
        .call_tool("execute_query", json!({ "query": "1", "time": "2023-01-01T00:00:00Z" }))
        .await;

    mcp_client
        .call_tool("execute_query", json!({ "query": "1", "time": "1672531200" }))
        .await;

    mcp_client
        .call_tool("execute_query", json!({ "query": "1", "time": 1672531200 }))
        .await;

    let times: Vec<String> = prometheus
        .requests()
        .iter()
        .map(|request| request.param("time").unwrap().to_string())
        .collect();

    assert_eq!(times, ["1672531200", "1672531200", "1672531200"]);

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn execute_range_query() {
    let data = json!({
        "resultType": "matrix",
        "result": [{
            "metric": { "__name__": "up", "job": "prometheus" },
            "values": [[1672531200, "1"], [1672531260, "1"]]
        }]
    });

    let prometheus = PrometheusMock::new()
        .success("/api/v1/query_range", data)
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client
        .call_tool(
            "execute_range_query",
            json!({
                "query": "up",
                "start": "2023-01-01T00:00:00Z",
                "end": "1672531260.5",
                "step": "1m"
            }),
        )
        .await;

    let payload = payload(&result);
    assert_eq!(payload["resultType"], "matrix");
    assert_eq!(payload["result"][0]["values"].as_array().unwrap().len(), 2);

    let request = prometheus.single_request();

    insta::assert_debug_snapshot!(request.query, @r#"
    [
        (
            "query",
            "up",
        ),
        (
            "start",
            "1672531200",
        ),
        (
            "end",
            "1672531260.5",
        ),
        (
            "step",
            "1m",
        ),
    ]
    "#);

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn list_metrics() {
    let prometheus = PrometheusMock::new()
        .success(
            "/api/v1/label/__name__/values",
            json!(["up", "go_goroutines", "http_requests_total"]),
        )
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client.call_tool("list_metrics", json!({})).await;
    assert_eq!(payload(&result), json!(["up", "go_goroutines", "http_requests_total"]));

    let result = mcp_client.call_tool("list_metrics", json!({ "limit": 2 })).await;
    assert_eq!(payload(&result), json!(["up", "go_goroutines"]));

    let result = mcp_client.call_tool("list_metrics", json!({ "limit": "2" })).await;
    assert_eq!(payload(&result), json!(["up", "go_goroutines"]));

    let result = mcp_client.call_tool("list_metrics", json!({ "limit": 0 })).await;
    assert_eq!(payload(&result).as_array().unwrap().len(), 3);

    let result = mcp_client.call_tool("list_metrics", json!({ "limit": 10 })).await;
    assert_eq!(payload(&result).as_array().unwrap().len(), 3);

    let limits: Vec<Option<String>> = prometheus
        .requests()
        .iter()
        .map(|request| request.param("limit").map(str::to_string))
        .collect();

    assert_eq!(
        limits,
        [
            None,
            Some("2".to_string()),
            Some("2".to_string()),
            None,
            Some("10".to_string())
        ]
    );

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn get_metric_metadata() {
    let data = json!({
        "http_requests_total": [
            { "type": "counter", "help": "Total HTTP requests.", "unit": "" },
            { "type": "counter", "help": "Number of HTTP requests.", "unit": "" }
        ]
    });

    let prometheus = PrometheusMock::new().success("/api/v1/metadata", data).spawn().await;
    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client
        .call_tool("get_metric_metadata", json!({ "metric": "http_requests_total" }))
        .await;

    insta::assert_json_snapshot!(payload(&result), @r#"
    [
      {
        "metric": "http_requests_total",
        "type": "counter",
        "help": "Total HTTP requests.",
        "unit": ""
      },
      {
        "metric": "http_requests_total",
        "type": "counter",
        "help": "Number of HTTP requests.",
        "unit": ""
      }
    ]
    "#);

    let result = mcp_client
        .call_tool("get_metric_metadata", json!({ "metric": "http_requests_total", "limit": 1 }))
        .await;

    assert_eq!(payload(&result).as_array().unwrap().len(), 1);

    let requests = prometheus.requests();
    assert_eq!(requests[0].param("metric"), Some("http_requests_total"));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn get_targets() {
    let data = json!({
        "activeTargets": [{
            "labels": { "job": "prometheus", "instance": "localhost:9090" },
            "scrapeUrl": "http://localhost:9090/metrics",
            "health": "up"
        }],
        "droppedTargets": []
    });

    let prometheus = PrometheusMock::new().success("/api/v1/targets", data).spawn().await;
    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client.call_tool("get_targets", json!({})).await;
    let payload = payload(&result);

    assert_eq!(payload["activeTargets"].as_array().unwrap().len(), 1);
    assert_eq!(payload["activeTargets"][0]["health"], "up");
    assert_eq!(payload["droppedTargets"], json!([]));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn list_labels() {
    let prometheus = PrometheusMock::new()
        .success("/api/v1/labels", json!(["__name__", "instance", "job"]))
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client.call_tool("list_labels", json!({ "limit": 2 })).await;
    assert_eq!(payload(&result), json!(["__name__", "instance"]));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn get_label_values() {
    let prometheus = PrometheusMock::new()
        .success("/api/v1/label/job/values", json!(["node", "prometheus"]))
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client
        .call_tool("get_label_values", json!({ "label_name": "job" }))
        .await;

    assert_eq!(payload(&result), json!(["node", "prometheus"]));
    assert_eq!(prometheus.single_request().path, "/api/v1/label/job/values");

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn find_series() {
    let data = json!([
        { "__name__": "up", "job": "prometheus", "instance": "localhost:9090" },
        { "__name__": "up", "job": "node", "instance": "localhost:9100" },
        { "__name__": "process_start_time_seconds", "job": "prometheus", "instance": "localhost:9090" }
    ]);

    let prometheus = PrometheusMock::new().success("/api/v1/series", data).spawn().await;
    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client
        .call_tool(
            "find_series",
            json!({
                "match": ["up", "process_start_time_seconds{job=\"prometheus\"}"],
                "start": "2023-01-01T00:00:00Z",
                "end": 1672534800,
                "limit": 2
            }),
        )
        .await;

    let payload = payload(&result);
    assert_eq!(payload.as_array().unwrap().len(), 2);
    assert_eq!(payload[1]["job"], "node");

    let request = prometheus.single_request();

    assert_eq!(
        request.params("match[]"),
        ["up", "process_start_time_seconds{job=\"prometheus\"}"]
    );
    assert_eq!(request.param("start"), Some("1672531200"));
    assert_eq!(request.param("end"), Some("1672534800"));
    assert_eq!(request.param("limit"), Some("2"));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn health_check() {
    let prometheus = PrometheusMock::new()
        .success("/api/v1/query", json!({ "resultType": "vector", "result": [] }))
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[("ORG_ID", "tenant-1")])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client.call_tool("health_check", json!({})).await;
    let payload = payload(&result);

    assert_eq!(payload["status"], "healthy");
    assert_eq!(payload["service"], "prometheus-mcp-server");
    assert_eq!(payload["checks"]["prometheus"], "healthy");

    insta::assert_json_snapshot!(payload["configuration"], @r#"
    {
      "prometheus_url_configured": true,
      "authentication_configured": false,
      "org_id_configured": true
    }
    "#);

    assert_eq!(prometheus.single_request().param("query"), Some("up"));

    mcp_client.disconnect().await;
}

#[tokio::test]
async fn health_check_degraded() {
    let prometheus = PrometheusMock::new()
        .respond("/api/v1/query", 503, "Service Unavailable")
        .spawn()
        .await;

    let server = TestServer::start(resolve_config(&prometheus.url, &[])).await;
    let mcp_client = server.mcp_client().await;

    let result = mcp_client.call_tool("health_check", json!({})).await;
    let payload = payload(&result);

    assert_eq!(payload["status"], "degraded");
    assert_eq!(payload["checks"]["server"], "healthy");
    assert_eq!(payload["checks"]["prometheus"], "unhealthy");
    assert_eq!(payload["prometheus_error"], "HTTP 503 error from Prometheus server");

    mcp_client.disconnect().await;
}
