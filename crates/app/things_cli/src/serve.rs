//! Transport selection for `things-mcp serve`.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use things_mcp::{ThingsMcpServer, ToolContext, ToolRegistry, build_registry, mcp_router};

use crate::cli::{ServeArgs, Transport};
use crate::{Error, Result};

pub async fn run(ctx: ToolContext, args: &ServeArgs) -> Result<()> {
    if !ctx.scripts.test_availability().await {
        warn!("Things 3 does not appear to be running; read tools will fail until it is opened");
    }

    let registry = Arc::new(build_registry(&ctx));
    info!(tools = registry.list_all().len(), transport = ?args.transport, "starting things-mcp");

    match args.transport {
        Transport::Stdio => serve_stdio(registry).await,
        Transport::Http => serve_http(registry, &args.bind).await,
    }
}

async fn serve_stdio(registry: Arc<ToolRegistry>) -> Result<()> {
    let service = ThingsMcpServer::new(registry)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| Error::Mcp(e.to_string()))?;
    service
        .waiting()
        .await
        .map_err(|e| Error::Mcp(e.to_string()))?;
    Ok(())
}

async fn serve_http(registry: Arc<ToolRegistry>, bind: &str) -> Result<()> {
    let ct = CancellationToken::new();
    let app = mcp_router(registry, ct.clone());

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "MCP server listening on /mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            ct.cancel();
        })
        .await?;
    Ok(())
}
