//! Configuration module for biji-mcp.
//!
//! Handles loading the knowledge-base configuration file and resolving
//! knowledge-base names.

mod resolve;
mod settings;

pub use settings::{template, write_template, Config, KnowledgeBase, Settings, CONFIG_PATH_ENV};
