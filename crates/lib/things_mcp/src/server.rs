//! MCP server handler: exposes the tool registry over rmcp.

use std::sync::Arc;

use rmcp::{
    RoleServer, ServerHandler,
    model::*,
    service::RequestContext,
};
use serde_json::Value;
use tracing::debug;

use crate::registry::ToolRegistry;

/// Things MCP server handler.
///
/// Cheap to clone; the Streamable HTTP service creates one per session and
/// they all share the same registry.
#[derive(Clone)]
pub struct ThingsMcpServer {
    registry: Arc<ToolRegistry>,
}

impl ThingsMcpServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl ServerHandler for ThingsMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Things MCP server: create, read, navigate and update to-dos and projects in Things"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "things-mcp".to_string(),
                version: crate::version().to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self
            .registry
            .list_all()
            .into_iter()
            .map(|d| d.to_tool())
            .collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(tool = %request.name, "call_tool");
        let args = request.arguments.map(Value::Object).unwrap_or(Value::Null);
        let envelope = self.registry.dispatch(&request.name, &args).await;
        Ok(envelope.into())
    }
}
