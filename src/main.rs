//! screenshot-mac-mcp: macOS app-window screenshot MCP server over stdio

use anyhow::Result;
use rmcp::{ServiceExt, transport::stdio};
use screenshot_mac_mcp::{config, handler::ScreenshotHandler, mcp::ScreenshotMcpServer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP stream; logs go to stderr.
    // Respects RUST_LOG, default: screenshot_mac_mcp=info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("screenshot_mac_mcp=info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false);
    if config::json_logs_enabled() {
        builder.json().init();
    } else {
        builder.init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        ttl_ms = config::cleanup_ttl_ms(),
        "screenshot-mac-mcp starting on stdio"
    );
    if !cfg!(target_os = "macos") {
        tracing::warn!("not running on macOS; every capture will fail");
    }

    let server = ScreenshotMcpServer::new(ScreenshotHandler::system());
    let service = server.serve(stdio()).await?;

    info!("Server info: {:?}", service.peer_info());
    service.waiting().await?;

    info!("screenshot-mac-mcp shutting down");
    Ok(())
}
