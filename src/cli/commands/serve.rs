//! Serve command implementation.

use crate::mcp::McpServer;
use anyhow::Result;
use std::path::Path;

/// Run the MCP server on stdio.
///
/// A broken configuration is logged and reported by every tool call instead of
/// stopping the server.
pub async fn run_serve(config_path: Option<&Path>, verbose: bool) -> Result<()> {
    let server = McpServer::load(config_path, verbose);
    server.run().await
}
