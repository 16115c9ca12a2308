//! MCP tools over the Prometheus HTTP API: validation, dispatch and response shaping.

#![deny(missing_docs)]

mod error;
mod health;
mod server;
mod shape;
mod tool;

use std::{sync::Arc, time::Duration};

use axum::{Router, http::StatusCode, routing};
use rmcp::transport::{
    StreamableHttpServerConfig, StreamableHttpService, streamable_http_server::session::never::NeverSessionManager,
};

pub use error::ToolError;
pub use server::McpServer;
pub use tool::ToolKind;

/// Path the streamable HTTP transport is served on.
pub const MCP_PATH: &str = "/mcp";

/// Creates an axum router serving the MCP server over stateless streamable HTTP at [`MCP_PATH`].
pub fn router(server: McpServer) -> Router {
    log::info!("Creating MCP router for path: {MCP_PATH}");

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(NeverSessionManager::default()),
        StreamableHttpServerConfig {
            sse_keep_alive: Some(Duration::from_secs(5)),
            stateful_mode: false,
        },
    );

    async fn handle_options() -> StatusCode {
        StatusCode::OK
    }

    Router::new().route(
        MCP_PATH,
        routing::get_service(service.clone())
            .post_service(service.clone())
            .delete_service(service)
            .options(handle_options),
    )
}
