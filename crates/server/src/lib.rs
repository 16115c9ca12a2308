//! Prometheus MCP server library.
//!
//! Provides a reusable server function to serve the MCP tools either for the binary, or for the integration tests.

#![deny(missing_docs)]

mod health;

use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, anyhow};
use axum::Router;
use config::{Config, Transport};
use mcp::McpServer;
use rmcp::{
    ServiceExt,
    transport::sse_server::{SseServer, SseServerConfig},
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};
use tokio_util::sync::CancellationToken;

pub use mcp::MCP_PATH;

/// Path of the SSE event stream.
pub const SSE_PATH: &str = "/sse";

/// Path SSE clients post their messages to.
pub const SSE_MESSAGE_PATH: &str = "/messages";

/// Configuration for serving the MCP server.
pub struct ServeConfig {
    /// The resolved configuration.
    pub config: Config,
    /// Cancelled to shut the server down gracefully.
    pub shutdown: CancellationToken,
}

/// Starts the server on the configured transport and runs it until shutdown.
pub async fn serve(ServeConfig { config, shutdown }: ServeConfig) -> anyhow::Result<()> {
    let transport = config.server.transport;
    let bind_address = config.server.bind_address();

    log::info!(
        "Starting Prometheus MCP server on {transport} for {} (authentication: {})",
        config.prometheus.url,
        config.prometheus.auth.method()
    );

    let server = McpServer::new(config).context("Failed to create the Prometheus client")?;

    match transport {
        Transport::Stdio => serve_io(server, (tokio::io::stdin(), tokio::io::stdout()), shutdown).await,
        Transport::Http | Transport::Sse => {
            let listener = TcpListener::bind(&bind_address)
                .await
                .map_err(|e| anyhow!("Failed to bind to {bind_address}: {e}"))?;

            let address = listener.local_addr()?;

            match transport {
                Transport::Sse => log::info!("MCP SSE endpoint available at: http://{address}{SSE_PATH}"),
                _ => log::info!("MCP endpoint available at: http://{address}{MCP_PATH}"),
            }

            let app = router(server, transport, &shutdown)?;
            serve_listener(listener, app, shutdown).await
        }
    }
}

/// Builds the HTTP application for a network transport: the MCP endpoint plus liveness routes.
pub fn router(server: McpServer, transport: Transport, shutdown: &CancellationToken) -> anyhow::Result<Router> {
    let app = match transport {
        Transport::Http => mcp::router(server),
        Transport::Sse => sse_router(server, shutdown),
        Transport::Stdio => return Err(anyhow!("the stdio transport is not served over HTTP")),
    };

    Ok(app.merge(health::router()))
}

fn sse_router(server: McpServer, shutdown: &CancellationToken) -> Router {
    let sse_config = SseServerConfig {
        // Only used when rmcp binds the socket itself; axum::serve does the binding here.
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        sse_path: SSE_PATH.to_string(),
        post_path: SSE_MESSAGE_PATH.to_string(),
        ct: shutdown.child_token(),
        sse_keep_alive: Some(Duration::from_secs(15)),
    };

    let (sse_server, router) = SseServer::new(sse_config);

    sse_server.with_service(move || {
        log::debug!("SSE client connected, creating a session");
        server.clone()
    });

    router
}

/// Serves an HTTP application on the listener until the shutdown token is cancelled.
pub async fn serve_listener(listener: TcpListener, app: Router, shutdown: CancellationToken) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;

    log::info!("HTTP server stopped");

    Ok(())
}

/// Serves MCP over a byte stream pair, such as stdin and stdout, until the peer disconnects or shutdown.
pub async fn serve_io<R, W>(server: McpServer, io: (R, W), shutdown: CancellationToken) -> anyhow::Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let running = server
        .serve_with_ct(io, shutdown)
        .await
        .map_err(|e| anyhow!("Failed to initialize the MCP session: {e}"))?;

    let reason = running.waiting().await?;
    log::info!("MCP session ended: {reason:?}");

    Ok(())
}
