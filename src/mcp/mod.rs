//! MCP (Model Context Protocol) server for biji-mcp.
//!
//! Exposes knowledge-base search, recall and listing as tools.
//! Implements JSON-RPC 2.0 over stdio.

mod protocol;
mod server;
mod tools;

pub use server::McpServer;
pub use tools::{TOOL_LIST_KB, TOOL_RECALL, TOOL_SEARCH};
