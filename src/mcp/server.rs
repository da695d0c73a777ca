//! MCP server implementation.

use super::protocol::*;
use super::tools::{
    get_tools, RecallArgs, SearchArgs, TOOL_LIST_KB, TOOL_LIST_KB_ALIAS, TOOL_RECALL,
    TOOL_RECALL_ALIAS, TOOL_SEARCH, TOOL_SEARCH_ALIAS,
};
use crate::client::{BijiClient, ClientOptions, RecallRequest, SearchRequest};
use crate::config::{Config, KnowledgeBase};
use crate::error::{BijiError, Result};
use crate::format::{format_kb_list, format_recall_results, format_search_result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "biji-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server exposing knowledge-base search and recall.
///
/// A configuration that failed to load does not stop the server; every tool
/// call then reports why.
pub struct McpServer {
    config: std::result::Result<Config, String>,
    config_path: PathBuf,
    verbose: bool,
}

impl McpServer {
    /// Load the configuration at `path` (or the default location) and build a server.
    pub fn load(path: Option<&Path>, verbose: bool) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::default_config_path);

        let config = Config::load_from(Some(&config_path)).map_err(|e| {
            error!("Failed to load configuration: {}", e);
            e.to_string()
        });

        Self {
            config,
            config_path,
            verbose,
        }
    }

    /// Build a server around an already loaded configuration.
    pub fn with_config(config: Config, verbose: bool) -> Self {
        Self {
            config: Ok(config),
            config_path: Config::default_config_path(),
            verbose,
        }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("biji-mcp server starting");

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    warn!("Failed to parse request: {}", e);
                    Some(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"))
                }
            };

            if let Some(response) = response {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC message. Notifications get no response.
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    /// Handle initialize request.
    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        if let Some(client) = &params.client_info {
            info!(
                "Client connected: {} {} (protocol {})",
                client.name,
                client.version.as_deref().unwrap_or("?"),
                params.protocol_version.as_deref().unwrap_or("?")
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ToolsListResult { tools: get_tools() };
        JsonRpcResponse::from_result(id, &result)
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        &format!("Invalid params: {}", e),
                    )
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let result = match self.call_tool(&params.name, params.arguments).await {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                if !matches!(e, BijiError::Config(_) | BijiError::Api { .. }) {
                    error!("Tool call {} failed: {}", params.name, e);
                }
                ToolCallResult::error(e.user_message())
            }
        };

        JsonRpcResponse::from_result(id, &result)
    }

    /// Dispatch one tool call to its implementation and render the result.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<String> {
        let config = self.config()?;
        let arguments = arguments.unwrap_or_else(|| json!({}));

        match name {
            TOOL_LIST_KB | TOOL_LIST_KB_ALIAS => Ok(format_kb_list(config)),
            TOOL_SEARCH | TOOL_SEARCH_ALIAS => {
                self.tool_search(config, parse_args(arguments)?).await
            }
            TOOL_RECALL | TOOL_RECALL_ALIAS => {
                self.tool_recall(config, parse_args(arguments)?).await
            }
            other => Err(BijiError::InvalidInput(format!("unknown tool: {}", other))),
        }
    }

    /// Search tool.
    async fn tool_search(&self, config: &Config, args: SearchArgs) -> Result<String> {
        let (kb_name, kb) = config.resolve(args.kb.as_deref())?;
        info!("Search in '{}' (deep_seek={})", kb_name, args.deep_seek);

        let request = SearchRequest::new(args.question, kb.topic_id.as_str())
            .with_deep_seek(args.deep_seek)
            .with_refs(args.with_refs);
        let outcome = self.client_for(config, kb)?.search(&request).await?;

        Ok(format_search_result(&outcome))
    }

    /// Recall tool.
    async fn tool_recall(&self, config: &Config, args: RecallArgs) -> Result<String> {
        let (kb_name, kb) = config.resolve(args.kb.as_deref())?;
        let top_k = args.top_k.unwrap_or(config.settings().default_top_k);
        info!("Recall in '{}' (top_k={})", kb_name, top_k);

        let request = RecallRequest::new(args.question, kb.topic_id.as_str())
            .with_top_k(top_k)
            .with_intent_rewrite(args.intent_rewrite);
        let results = self.client_for(config, kb)?.recall(&request).await?;

        Ok(format_recall_results(&results))
    }

    fn config(&self) -> Result<&Config> {
        self.config.as_ref().map_err(|reason| {
            BijiError::Config(format!(
                "configuration not loaded, check {}: {}",
                self.config_path.display(),
                reason
            ))
        })
    }

    /// Each call gets its own client bound to the resolved knowledge base's token.
    fn client_for(&self, config: &Config, kb: &KnowledgeBase) -> Result<BijiClient> {
        BijiClient::with_options(
            kb.token.as_str(),
            ClientOptions::from_settings(config.settings(), self.verbose),
        )
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| BijiError::InvalidInput(format!("invalid arguments: {}", e)))
}
