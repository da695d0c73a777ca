//! Markdown rendering of tool results.

use crate::client::{RecallRecord, SearchOutcome};
use crate::config::Config;

/// Citation excerpts are cut to this many characters.
const CITATION_PREVIEW_CHARS: usize = 100;

/// Render recall results as a numbered list. An empty result still says so explicitly.
pub fn format_recall_results(results: &[RecallRecord]) -> String {
    if results.is_empty() {
        return "## Recall results (0)\n\nNo matching content found.".to_string();
    }

    let mut lines = vec![format!("## Recall results ({})\n", results.len())];

    for (i, record) in results.iter().enumerate() {
        lines.push(format!(
            "### {}. {} [{}] score: {:.2}",
            i + 1,
            record.title,
            record.kind,
            record.score
        ));
        lines.push(record.content.clone());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render a search outcome: the answer, then citations and reasoning when present.
pub fn format_search_result(outcome: &SearchOutcome) -> String {
    let mut lines = vec!["## Answer\n".to_string(), outcome.answer.clone(), String::new()];

    if !outcome.references.is_empty() {
        lines.push("## Citations\n".to_string());
        for (i, citation) in outcome.references.iter().enumerate() {
            lines.push(format!(
                "{}. **{}** - \"{}\"",
                i + 1,
                citation.title,
                truncate(&citation.content, CITATION_PREVIEW_CHARS)
            ));
        }
        lines.push(String::new());
    }

    if let Some(thinking) = outcome.thinking.as_deref().filter(|t| !t.is_empty()) {
        lines.push("## Reasoning\n".to_string());
        lines.push(thinking.to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render the configured knowledge bases as a table, marking the default.
pub fn format_kb_list(config: &Config) -> String {
    let mut lines = vec![
        "## Configured knowledge bases\n".to_string(),
        "| Name | Description | Default |".to_string(),
        "|------|-------------|---------|".to_string(),
    ];

    for (name, kb) in config.knowledge_bases() {
        let is_default = if name == config.default_name() { "✓" } else { "" };
        let description = kb.description.as_deref().unwrap_or("-");
        lines.push(format!("| {} | {} | {} |", name, description, is_default));
    }

    lines.join("\n")
}

/// Truncate to `max_chars` characters, appending `...` when anything was cut.
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
