mod prometheus;

pub use prometheus::{MockPrometheus, PrometheusMock, RecordedRequest};

use std::{collections::HashMap, net::SocketAddr};

use config::{Config, Transport};
use mcp::McpServer;
use rmcp::{
    RoleClient, ServiceError,
    model::{CallToolRequestParam, CallToolResult, ErrorData, InitializeResult, ListToolsResult},
    service::{RunningService, ServiceExt},
    transport::{SseClientTransport, StreamableHttpClientTransport},
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Resolves a configuration pointing at `url`, with extra environment variables.
pub fn resolve_config(url: &str, vars: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    env.insert("PROMETHEUS_URL".to_string(), url.to_string());

    Config::resolve(|key| env.get(key).cloned()).unwrap()
}

/// Test server that manages the lifecycle of a network server instance.
pub struct TestServer {
    pub address: SocketAddr,
    pub transport: Transport,
    client: reqwest::Client,
    _shutdown: DropGuard,
}

impl TestServer {
    /// Serves the configuration on an ephemeral port with the configured transport.
    ///
    /// The stdio transport is served as streamable HTTP; use [`McpTestClient::stdio`] for stdio.
    pub async fn start(config: Config) -> Self {
        let transport = match config.server.transport {
            Transport::Stdio => Transport::Http,
            transport => transport,
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let shutdown = CancellationToken::new();
        let server = McpServer::new(config).unwrap();
        let app = server::router(server, transport, &shutdown).unwrap();

        let serve_shutdown = shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = server::serve_listener(listener, app, serve_shutdown).await {
                eprintln!("Test server failed: {e}");
            }
        });

        Self {
            address,
            transport,
            client: reqwest::Client::new(),
            _shutdown: shutdown.drop_guard(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    /// Plain HTTP GET against the server.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// Connects an MCP client over the server's transport.
    pub async fn mcp_client(&self) -> McpTestClient {
        match self.transport {
            Transport::Sse => McpTestClient::sse(self.url(server::SSE_PATH)).await,
            _ => McpTestClient::streamable_http(self.url(server::MCP_PATH)).await,
        }
    }
}

/// MCP client for testing MCP protocol functionality
pub struct McpTestClient {
    service: RunningService<RoleClient, ()>,
    _server: Option<DropGuard>,
}

impl McpTestClient {
    pub async fn streamable_http(url: String) -> Self {
        let transport = StreamableHttpClientTransport::from_uri(url);
        let service = ().serve(transport).await.unwrap();

        Self { service, _server: None }
    }

    pub async fn sse(url: String) -> Self {
        let transport = SseClientTransport::start(url).await.unwrap();
        let service = ().serve(transport).await.unwrap();

        Self { service, _server: None }
    }

    /// Serves the configuration over an in-memory byte stream, as the stdio transport does over stdin and stdout.
    pub async fn stdio(config: Config) -> Self {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let shutdown = CancellationToken::new();

        let server = McpServer::new(config).unwrap();
        let server_shutdown = shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = server::serve_io(server, tokio::io::split(server_io), server_shutdown).await {
                eprintln!("Test stdio server failed: {e}");
            }
        });

        let service = ().serve(tokio::io::split(client_io)).await.unwrap();

        Self {
            service,
            _server: Some(shutdown.drop_guard()),
        }
    }

    pub fn server_info(&self) -> &InitializeResult {
        self.service.peer_info().unwrap()
    }

    pub async fn list_tools(&self) -> ListToolsResult {
        self.service.list_tools(Default::default()).await.unwrap()
    }

    pub async fn try_call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ServiceError> {
        let arguments = arguments.as_object().cloned();

        self.service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await
    }

    /// Calls a tool and expects it to succeed.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> CallToolResult {
        self.try_call_tool(name, arguments).await.unwrap()
    }

    /// Calls a tool and expects an MCP error response.
    pub async fn call_tool_error(&self, name: &str, arguments: Value) -> ErrorData {
        match self.try_call_tool(name, arguments).await {
            Err(ServiceError::McpError(error)) => error,
            other => unreachable!("expected an MCP error, got {other:?}"),
        }
    }

    pub async fn disconnect(self) {
        self.service.cancel().await.unwrap();
    }
}

/// The JSON payload of a tool result: structured content if present, otherwise the first text content.
pub fn payload(result: &CallToolResult) -> Value {
    if let Some(structured) = &result.structured_content {
        return structured.clone();
    }

    let text = result.content[0].as_text().unwrap();
    serde_json::from_str(&text.text).unwrap()
}
