//! biji-mcp CLI entry point.

use anyhow::Result;
use biji_mcp::cli::{commands, Cli, Commands};
use biji_mcp::client::ClientOptions;
use biji_mcp::config::Config;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let debug_env = ClientOptions::verbose_from_env();

    // Initialize logging. Stdout belongs to the protocol, so logs go to stderr.
    let log_level = match (cli.verbose, debug_env) {
        (0, false) => "info",
        (0, true) | (1, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("biji_mcp={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let verbose = debug_env || cli.verbose > 0;
    let config_path = cli.config_path();

    match &cli.command {
        None | Some(Commands::Serve) => {
            commands::run_serve(config_path.as_deref(), verbose).await?;
        }

        Some(Commands::Search {
            question,
            kb,
            deep_seek,
            no_refs,
        }) => {
            let config = Config::load_from(config_path.as_deref())?;
            commands::run_search(question, kb.as_deref(), *deep_seek, !*no_refs, &config, verbose)
                .await?;
        }

        Some(Commands::Recall {
            question,
            kb,
            top_k,
            intent_rewrite,
            select_matrix,
        }) => {
            let config = Config::load_from(config_path.as_deref())?;
            commands::run_recall(
                question,
                kb.as_deref(),
                *top_k,
                *intent_rewrite,
                *select_matrix,
                &config,
                verbose,
            )
            .await?;
        }

        Some(Commands::List) => {
            let config = Config::load_from(config_path.as_deref())?;
            commands::run_list(&config)?;
        }

        Some(Commands::Config { action }) => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            commands::run_config(action, &path)?;
        }
    }

    Ok(())
}
