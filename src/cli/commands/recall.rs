//! Recall command implementation.

use crate::cli::Output;
use crate::client::{BijiClient, ClientOptions, RecallRequest};
use crate::config::Config;
use crate::format::format_recall_results;
use anyhow::Result;

/// Run the recall command.
pub async fn run_recall(
    question: &str,
    kb: Option<&str>,
    top_k: Option<u32>,
    intent_rewrite: bool,
    select_matrix: bool,
    config: &Config,
    verbose: bool,
) -> Result<()> {
    let (kb_name, kb) = config.resolve(kb)?;
    let top_k = top_k.unwrap_or(config.settings().default_top_k);

    let client = BijiClient::with_options(
        kb.token.as_str(),
        ClientOptions::from_settings(config.settings(), verbose),
    )?;
    let request = RecallRequest::new(question, kb.topic_id.as_str())
        .with_top_k(top_k)
        .with_intent_rewrite(intent_rewrite)
        .with_select_matrix(select_matrix);

    let spinner = Output::spinner(&format!("Recalling from '{}'...", kb_name));
    let results = client.recall(&request).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            println!("{}", format_recall_results(&results));
            Ok(())
        }
        Err(e) => {
            Output::error(&e.user_message());
            Err(e.into())
        }
    }
}
