//! A mock Prometheus HTTP API that records every request it receives.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: String,
}

/// A request received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
}

impl RecordedRequest {
    /// The first value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Every value of a repeated query parameter, in order.
    pub fn params(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Builder for a mock Prometheus server.
#[derive(Default)]
pub struct PrometheusMock {
    responses: HashMap<String, CannedResponse>,
    delay: Duration,
}

impl PrometheusMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `path` with a success envelope around `data`.
    pub fn success(self, path: &str, data: Value) -> Self {
        let body = json!({ "status": "success", "data": data }).to_string();
        self.respond(path, 200, body)
    }

    /// Answers `path` with a raw status and body.
    pub fn respond(mut self, path: &str, status: u16, body: impl Into<String>) -> Self {
        let response = CannedResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.into(),
        };

        self.responses.insert(path.to_string(), response);
        self
    }

    /// Delays every response.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn spawn(self) -> MockPrometheus {
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = MockState {
            responses: Arc::new(self.responses),
            delay: self.delay,
            requests: requests.clone(),
        };

        let app = Router::new().fallback(handle).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockPrometheus {
            url: format!("http://{address}"),
            requests,
        }
    }
}

#[derive(Clone)]
struct MockState {
    responses: Arc<HashMap<String, CannedResponse>>,
    delay: Duration,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn handle(
    State(state): State<MockState>,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let headers = headers
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or_default().to_string()))
        .collect();

    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        query,
        headers,
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    match state.responses.get(uri.path()) {
        Some(response) => (response.status, response.body.clone()),
        None => (StatusCode::NOT_FOUND, "404 page not found\n".to_string()),
    }
}

/// A running mock Prometheus server.
pub struct MockPrometheus {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockPrometheus {
    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The only request received so far.
    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request: {requests:#?}");

        requests.into_iter().next().unwrap()
    }
}
