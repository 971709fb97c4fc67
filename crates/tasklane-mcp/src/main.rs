//! Tasklane MCP server binary.
//!
//! This binary runs the MCP server using stdio transport.

use tasklane_mcp::TasklaneMcpServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tasklane=info,tasklane_mcp=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting tasklane-mcp server");

    let server = TasklaneMcpServer::new();
    server.run().await?;

    Ok(())
}
