//! CLI module for biji-mcp.

pub mod commands;
mod output;

pub use output::{mask_token, Output};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// biji-mcp - Get笔记 knowledge bases as MCP tools
///
/// Without a subcommand the MCP server runs on stdio.
#[derive(Parser, Debug)]
#[command(name = "biji-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file (default: ~/.biji-mcp/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Configuration path given on the command line, with `~` expanded.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config
            .as_deref()
            .map(crate::config::Config::expand_path)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start MCP server on stdio for AI assistant integration (default)
    Serve,

    /// Ask a question and get an AI answer with citations
    Search {
        /// The question to ask
        question: String,

        /// Knowledge base name (exact or unique substring)
        #[arg(short, long)]
        kb: Option<String>,

        /// Enable deep reasoning and show the reasoning text
        #[arg(short, long)]
        deep_seek: bool,

        /// Do not request citations
        #[arg(long)]
        no_refs: bool,
    },

    /// Recall raw snippets ordered by relevance
    Recall {
        /// The search question
        question: String,

        /// Knowledge base name (exact or unique substring)
        #[arg(short, long)]
        kb: Option<String>,

        /// Number of results (default: settings.default_top_k)
        #[arg(short, long)]
        top_k: Option<u32>,

        /// Rewrite the question for intent before recalling
        #[arg(long)]
        intent_rewrite: bool,

        /// Have the API re-select the recalled results
        #[arg(long)]
        select_matrix: bool,
    },

    /// List configured knowledge bases
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration with tokens masked
    Show,

    /// Write a template configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}
