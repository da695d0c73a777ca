//! biji-mcp - Get笔记 knowledge bases as MCP tools
//!
//! Exposes the Get笔记 open API to AI assistants over the Model Context
//! Protocol, so an agent can ask natural-language questions of a personal
//! knowledge base.
//!
//! # Overview
//!
//! Three tools are served:
//! - `biji_search` - AI answer with citations, decoded from a streaming response
//! - `biji_recall` - raw snippets ordered by relevance
//! - `biji_list_kb` - the configured knowledge bases
//!
//! # Architecture
//!
//! - `config` - Configuration file loading and knowledge-base name resolution
//! - `client` - API client and stream decoder
//! - `format` - Markdown rendering of results
//! - `mcp` - JSON-RPC server and tool dispatch
//! - `cli` - Command-line front end
//!
//! # Example
//!
//! ```rust,no_run
//! use biji_mcp::client::{BijiClient, ClientOptions, SearchRequest};
//! use biji_mcp::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let (_, kb) = config.resolve(Some("work"))?;
//!
//!     let client = BijiClient::with_options(
//!         kb.token.as_str(),
//!         ClientOptions::from_settings(config.settings(), false),
//!     )?;
//!     let outcome = client
//!         .search(&SearchRequest::new("What did we decide last week?", kb.topic_id.as_str()))
//!         .await?;
//!     println!("{}", outcome.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod mcp;

pub use error::{BijiError, Result};
