//! Search command implementation.

use crate::cli::Output;
use crate::client::{BijiClient, ClientOptions, SearchRequest};
use crate::config::Config;
use crate::format::format_search_result;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    question: &str,
    kb: Option<&str>,
    deep_seek: bool,
    refs: bool,
    config: &Config,
    verbose: bool,
) -> Result<()> {
    let (kb_name, kb) = config.resolve(kb)?;

    let client = BijiClient::with_options(
        kb.token.as_str(),
        ClientOptions::from_settings(config.settings(), verbose),
    )?;
    let request = SearchRequest::new(question, kb.topic_id.as_str())
        .with_deep_seek(deep_seek)
        .with_refs(refs);

    let spinner = Output::spinner(&format!("Searching '{}'...", kb_name));
    let outcome = client.search(&request).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(outcome) => {
            println!("{}", format_search_result(&outcome));
            Ok(())
        }
        Err(e) => {
            Output::error(&e.user_message());
            Err(e.into())
        }
    }
}
