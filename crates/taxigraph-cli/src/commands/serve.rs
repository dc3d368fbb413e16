//! MCP server command

use clap::Args;
use taxigraph_mcp::McpServer;

use crate::AppContext;

#[derive(Args)]
pub struct ServeArgs {
    /// Serve over HTTP/SSE on this address instead of stdio (e.g. 127.0.0.1:3333)
    #[arg(long, value_name = "ADDR")]
    pub sse: Option<String>,

    /// Bearer token required by the SSE endpoints
    #[arg(long, env = "TAXIGRAPH_SSE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

pub async fn run(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let server = McpServer::new(ctx.storage.clone());

    match &args.sse {
        None => {
            tracing::info!("Starting MCP server on stdio...");
            server.run_stdio().await
        }
        Some(addr) => serve_sse(server, addr, args.token.clone()).await,
    }
}

#[cfg(feature = "sse")]
async fn serve_sse(
    server: McpServer<dyn taxigraph_storage::StorageBackend>,
    addr: &str,
    token: Option<String>,
) -> anyhow::Result<()> {
    if token.is_none() {
        tracing::warn!("SSE server running without authentication");
    }
    taxigraph_mcp::run_sse_server(std::sync::Arc::new(server), addr, token).await
}

#[cfg(not(feature = "sse"))]
async fn serve_sse(
    _server: McpServer<dyn taxigraph_storage::StorageBackend>,
    addr: &str,
    _token: Option<String>,
) -> anyhow::Result<()> {
    anyhow::bail!(
        "Cannot serve on {}: taxigraph was built without the 'sse' feature",
        addr
    )
}
