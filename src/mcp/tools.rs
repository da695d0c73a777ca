//! MCP tool definitions and argument types.

use super::protocol::Tool;
use serde::Deserialize;
use serde_json::json;

pub const TOOL_SEARCH: &str = "biji_search";
pub const TOOL_RECALL: &str = "biji_recall";
pub const TOOL_LIST_KB: &str = "biji_list_kb";

// Generic names some clients use; accepted on calls, not advertised.
pub const TOOL_SEARCH_ALIAS: &str = "search_tool";
pub const TOOL_RECALL_ALIAS: &str = "recall_tool";
pub const TOOL_LIST_KB_ALIAS: &str = "list_kb_tool";

/// Arguments of `biji_search`.
#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub question: String,
    #[serde(default)]
    pub kb: Option<String>,
    #[serde(default, alias = "deep_reasoning")]
    pub deep_seek: bool,
    #[serde(default = "default_true", alias = "with_citations")]
    pub with_refs: bool,
}

/// Arguments of `biji_recall`.
#[derive(Debug, Deserialize)]
pub struct RecallArgs {
    pub question: String,
    #[serde(default)]
    pub kb: Option<String>,
    /// Falls back to `settings.default_top_k`.
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub intent_rewrite: bool,
}

fn default_true() -> bool {
    true
}

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: TOOL_SEARCH.to_string(),
            description: "Search a Get笔记 knowledge base. \
                Returns an AI-generated answer with the notes it cites."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The question to ask"
                    },
                    "kb": {
                        "type": "string",
                        "description": "Knowledge base name (optional, defaults to the configured default)"
                    },
                    "deep_seek": {
                        "type": "boolean",
                        "description": "Enable deep reasoning and include the reasoning text",
                        "default": false
                    },
                    "with_refs": {
                        "type": "boolean",
                        "description": "Include cited sources",
                        "default": true
                    }
                },
                "required": ["question"]
            }),
        },
        Tool {
            name: TOOL_RECALL.to_string(),
            description: "Recall raw snippets from a Get笔记 knowledge base without AI processing. \
                Returns results ordered by relevance."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The search question"
                    },
                    "kb": {
                        "type": "string",
                        "description": "Knowledge base name (optional, defaults to the configured default)"
                    },
                    "top_k": {
                        "type": "integer",
                        "description": "Number of results to return",
                        "default": 10
                    },
                    "intent_rewrite": {
                        "type": "boolean",
                        "description": "Rewrite the question for intent before recalling",
                        "default": false
                    }
                },
                "required": ["question"]
            }),
        },
        Tool {
            name: TOOL_LIST_KB.to_string(),
            description: "List all configured Get笔记 knowledge bases.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ]
}
