// Standalone MCP server binary

use anyhow::{Context, Result};
use composio_mcp::server::McpServer;
use composio_mcp::tools::{ManagementTool, NotionTool, ToolRegistry, ZoomTool};
use composio_sdk::{ComposioClient, CredentialLoader, Domain};

/// Optional override of the broker root URL.
const BASE_URL_ENV: &str = "COMPOSIO_BASE_URL";

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!("Composio MCP server starting...");

    let credentials = CredentialLoader::from_env()
        .load()
        .await
        .context("Failed to load Composio credentials")?;

    let mut builder = ComposioClient::builder().credentials(credentials);
    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        builder = builder.base_url(base_url);
    }
    let client = builder.build().context("Failed to build Composio client")?;

    let mut registry = ToolRegistry::new();
    registry.register_all(ManagementTool::all(&client.management()));

    match client.notion() {
        Ok(notion) => registry.register_all(NotionTool::all(&notion)),
        Err(e) => tracing::warn!("Notion tools disabled: {}", e),
    }
    match client.zoom() {
        Ok(zoom) => registry.register_all(ZoomTool::all(&zoom)),
        Err(e) => tracing::warn!("Zoom tools disabled: {}", e),
    }

    tracing::info!("Registered {} tools", registry.len());

    let server = McpServer::new(registry);
    server.start().await?;

    Ok(())
}
