//! List command implementation.

use crate::cli::Output;
use crate::config::Config;
use anyhow::Result;

/// Run the list command.
pub fn run_list(config: &Config) -> Result<()> {
    Output::header(&format!(
        "Configured knowledge bases ({})",
        config.names().count()
    ));
    println!();

    for (name, kb) in config.knowledge_bases() {
        let marker = if name == config.default_name() {
            " (default)"
        } else {
            ""
        };
        Output::kv(
            &format!("{}{}", name, marker),
            kb.description.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
