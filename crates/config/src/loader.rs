use http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{Auth, Config, ConfigError, DEFAULT_REQUEST_TIMEOUT, PrometheusConfig, ServerConfig, Transport};

/// Base URL of the upstream Prometheus-compatible API.
pub const PROMETHEUS_URL: &str = "PROMETHEUS_URL";
/// Basic auth user name.
pub const PROMETHEUS_USERNAME: &str = "PROMETHEUS_USERNAME";
/// Basic auth password.
pub const PROMETHEUS_PASSWORD: &str = "PROMETHEUS_PASSWORD";
/// Bearer token, takes precedence over basic auth.
pub const PROMETHEUS_TOKEN: &str = "PROMETHEUS_TOKEN";
/// Tenant id sent as `X-Scope-OrgID`.
pub const ORG_ID: &str = "ORG_ID";
/// MCP transport: stdio, http or sse.
pub const PROMETHEUS_MCP_SERVER_TRANSPORT: &str = "PROMETHEUS_MCP_SERVER_TRANSPORT";
/// Host to bind in http and sse modes.
pub const PROMETHEUS_MCP_BIND_HOST: &str = "PROMETHEUS_MCP_BIND_HOST";
/// Port to bind in http and sse modes.
pub const PROMETHEUS_MCP_BIND_PORT: &str = "PROMETHEUS_MCP_BIND_PORT";
/// Upstream request timeout as a duration string.
pub const PROMETHEUS_REQUEST_TIMEOUT: &str = "PROMETHEUS_REQUEST_TIMEOUT";

const DEFAULT_BIND_HOST: &str = "127.0.0.1";
const DEFAULT_BIND_PORT: u16 = 8080;

pub(crate) fn resolve<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Empty strings behave like unset variables.
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let url = parse_url(var(PROMETHEUS_URL))?;
    let auth = resolve_auth(var(PROMETHEUS_USERNAME), var(PROMETHEUS_PASSWORD), var(PROMETHEUS_TOKEN))?;

    let org_id = var(ORG_ID);

    if let Some(ref org_id) = org_id
        && HeaderValue::from_str(org_id).is_err()
    {
        return Err(ConfigError::InvalidOrgId);
    }

    let timeout = match var(PROMETHEUS_REQUEST_TIMEOUT) {
        Some(value) => duration_str::parse(&value).map_err(|e| ConfigError::InvalidTimeout {
            reason: e.to_string(),
            value,
        })?,
        None => DEFAULT_REQUEST_TIMEOUT,
    };

    let transport = match var(PROMETHEUS_MCP_SERVER_TRANSPORT) {
        Some(value) => value.parse()?,
        None => Transport::default(),
    };

    let bind_host = var(PROMETHEUS_MCP_BIND_HOST).unwrap_or_else(|| DEFAULT_BIND_HOST.to_string());

    let bind_port = match var(PROMETHEUS_MCP_BIND_PORT) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort(value))?,
        None => DEFAULT_BIND_PORT,
    };

    log::debug!(
        "Resolved configuration: url={url}, authentication={}, org_id={}, transport={transport}",
        auth.method(),
        org_id.as_deref().unwrap_or("none"),
    );

    Ok(Config {
        prometheus: PrometheusConfig {
            url,
            auth,
            org_id,
            timeout,
        },
        server: ServerConfig {
            transport,
            bind_host,
            bind_port,
        },
    })
}

fn parse_url(value: Option<String>) -> Result<Url, ConfigError> {
    let value = value.ok_or(ConfigError::MissingUrl)?;

    let url = Url::parse(&value).map_err(|e| ConfigError::InvalidUrl {
        reason: e.to_string(),
        value: value.clone(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::UnsupportedScheme(scheme.to_string())),
    }
}

fn resolve_auth(
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
) -> Result<Auth, ConfigError> {
    let basic = match (username, password) {
        (Some(username), Some(password)) => Some((username, password)),
        (Some(_), None) => {
            return Err(ConfigError::IncompleteBasicAuth {
                present: PROMETHEUS_USERNAME,
                missing: PROMETHEUS_PASSWORD,
            });
        }
        (None, Some(_)) => {
            return Err(ConfigError::IncompleteBasicAuth {
                present: PROMETHEUS_PASSWORD,
                missing: PROMETHEUS_USERNAME,
            });
        }
        (None, None) => None,
    };

    let auth = match (token, basic) {
        (Some(token), basic) => {
            if basic.is_some() {
                log::warn!("Both {PROMETHEUS_TOKEN} and basic auth credentials are set, using the bearer token");
            }

            if HeaderValue::from_str(&format!("Bearer {token}")).is_err() {
                return Err(ConfigError::InvalidToken);
            }

            Auth::Bearer {
                token: SecretString::from(token),
            }
        }
        (None, Some((username, password))) => Auth::Basic {
            username,
            password: SecretString::from(password),
        },
        (None, None) => Auth::None,
    };

    Ok(auth)
}
