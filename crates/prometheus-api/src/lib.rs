//! Client for the Prometheus HTTP API, as spoken by Prometheus, Cortex, Mimir and Thanos.

#![deny(missing_docs)]

mod endpoint;
mod error;
mod response;
mod time;

use std::time::Duration;

use config::{Auth, PrometheusConfig};
use http::{HeaderMap, HeaderValue};
use reqwest::{
    Client,
    header::{AUTHORIZATION, USER_AGENT},
};
use secrecy::ExposeSecret;
use serde_json::Value;
use url::Url;

pub use endpoint::Endpoint;
pub use error::ApiError;
pub use time::{InvalidTimestamp, Timestamp};

/// Header used by multi-tenant backends to scope a request to one tenant.
pub const ORG_ID_HEADER: &str = "X-Scope-OrgID";

/// A query-string parameter. Keys may repeat, as `match[]` does.
pub type QueryParam = (&'static str, String);

/// Stateless client for one configured upstream.
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Clone)]
pub struct PrometheusClient {
    client: Client,
    base_url: Url,
    auth: Auth,
    timeout: Duration,
}

impl PrometheusClient {
    /// Creates a client from the resolved connection settings.
    pub fn new(config: &PrometheusConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("prometheus-mcp-server/", env!("CARGO_PKG_VERSION"))),
        );

        if let Some(ref org_id) = config.org_id {
            let value = HeaderValue::from_str(org_id).map_err(|e| ApiError::Transport {
                message: format!("invalid {ORG_ID_HEADER} header value: {e}"),
            })?;

            headers.insert(ORG_ID_HEADER, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                log::error!("Failed to create HTTP client for Prometheus: {e}");

                ApiError::Transport {
                    message: format!("failed to create HTTP client: {e}"),
                }
            })?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            auth: config.auth.clone(),
            timeout: config.timeout,
        })
    }

    /// The configured upstream base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issues a `GET` to the endpoint and returns the `data` field of a successful response.
    ///
    /// No retries are made. Dropping the returned future aborts the request.
    pub async fn get(&self, endpoint: Endpoint<'_>, params: &[QueryParam]) -> Result<Value, ApiError> {
        let url = endpoint.url(&self.base_url)?;

        log::debug!("Making Prometheus API request to {endpoint} with {} parameter(s)", params.len());

        let mut request = self.client.get(url.clone()).query(params);

        request = match &self.auth {
            Auth::None => request,
            Auth::Basic { username, password } => request.basic_auth(username, Some(password.expose_secret())),
            Auth::Bearer { token } => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).map_err(|_| {
                    ApiError::Transport {
                        message: "the configured bearer token is not a valid header value".to_string(),
                    }
                })?;

                value.set_sensitive(true);
                request.header(AUTHORIZATION, value)
            }
        };

        let response = request.send().await.map_err(|e| self.classify(&url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(&url, e))?;

        match response::parse(status, &body) {
            Ok(success) => {
                for warning in &success.warnings {
                    log::warn!("Prometheus returned a warning for {endpoint}: {warning}");
                }

                log::debug!("Prometheus API request to {endpoint} succeeded");

                Ok(success.data)
            }
            Err(error) => {
                log::error!("Prometheus API request to {endpoint} failed (HTTP {status}): {error}");
                Err(error)
            }
        }
    }

    fn classify(&self, url: &Url, error: reqwest::Error) -> ApiError {
        let url = redact(url);

        let error = if error.is_timeout() {
            ApiError::Timeout {
                url,
                timeout: self.timeout,
            }
        } else if error.is_connect() {
            ApiError::Unreachable {
                url,
                message: root_cause(&error),
            }
        } else {
            ApiError::Transport {
                message: root_cause(&error),
            }
        };

        log::error!("{error}");

        error
    }
}

/// Strips credentials embedded in the URL before it is logged or returned.
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.set_query(None);
    url.to_string()
}

fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;

    while let Some(source) = current.source() {
        current = source;
    }

    current.to_string()
}
