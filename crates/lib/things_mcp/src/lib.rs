//! # things_mcp
//!
//! MCP (Model Context Protocol) server for the Things task manager.
//!
//! Tools are [`handler::ToolHandler`]s collected in a [`registry::ToolRegistry`];
//! [`server::ThingsMcpServer`] serves the registry over stdio or, via
//! [`mcp_router`], over Streamable HTTP.

pub mod envelope;
pub mod handler;
pub mod registry;
pub mod server;
pub mod tools;

use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

pub use envelope::ResponseEnvelope;
pub use handler::{ToolDescriptor, ToolHandler};
pub use registry::ToolRegistry;
pub use server::ThingsMcpServer;
pub use tools::ToolContext;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Registry holding every Things tool.
pub fn build_registry(ctx: &ToolContext) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for handler in tools::handlers(ctx) {
        registry.register(handler);
    }
    registry
}

/// Build an Axum router that serves the MCP Streamable HTTP endpoint at `/mcp`.
///
/// `ct` cancels open SSE streams on shutdown.
pub fn mcp_router(registry: Arc<ToolRegistry>, ct: CancellationToken) -> axum::Router {
    let service: StreamableHttpService<ThingsMcpServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(ThingsMcpServer::new(registry.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: true,
                cancellation_token: ct,
                ..Default::default()
            },
        );

    axum::Router::new().nest_service("/mcp", service)
}
