use config::Config;
use prometheus_api::{Endpoint, PrometheusClient, Timestamp};
use serde_json::{Value, json};

/// Builds the `health_check` report. Probe failures degrade the status, they do not fail the call.
pub(crate) async fn report(config: &Config, client: &PrometheusClient) -> Value {
    let params = [
        ("query", "up".to_string()),
        ("time", Timestamp::now().to_query_value()),
    ];

    let probe = client.get(Endpoint::Query, &params).await;

    let mut report = json!({
        "status": "healthy",
        "service": "prometheus-mcp-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Timestamp::now().to_string(),
        "transport": config.server.transport.as_ref(),
        "configuration": {
            "prometheus_url_configured": true,
            "authentication_configured": config.prometheus.auth.is_configured(),
            "org_id_configured": config.prometheus.org_id.is_some(),
        },
        "checks": {
            "server": "healthy",
            "prometheus": "healthy",
        },
    });

    if let Err(error) = probe {
        log::warn!("Prometheus health probe failed: {error}");

        report["status"] = json!("degraded");
        report["checks"]["prometheus"] = json!("unhealthy");
        report["prometheus_error"] = json!(error.to_string());
    }

    log::info!(
        "Health check completed with status {}",
        report["status"].as_str().unwrap_or_default()
    );

    report
}
