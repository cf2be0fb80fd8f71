//! MCP server over stdio.

pub mod protocol;
pub mod server;

use tracing::info;

use crate::state::AppState;

/// Serve the tool surface over stdio until EOF.
pub async fn serve(state: &AppState) -> anyhow::Result<()> {
    let toolbox = state.toolbox().await?;
    let server = server::McpServer::new(toolbox);
    info!(
        container = %state.settings.exec.container,
        strict_confirm = state.settings.exec.strict_confirm,
        "MCP server listening on stdio"
    );
    server.run(tokio::io::stdin(), tokio::io::stdout()).await?;
    info!("MCP client disconnected");
    Ok(())
}
