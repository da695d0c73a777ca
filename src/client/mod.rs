//! Client for the Get笔记 open API.
//!
//! Two endpoints are used: a synchronous recall endpoint returning raw snippets,
//! and a streaming search endpoint returning an AI answer with citations.

mod models;
pub mod stream;

pub use models::{Citation, RecallKind, RecallRecord, SearchOutcome};
pub use stream::{decode_lines, Flow, LineStream, StreamDecoder};

use crate::config::Settings;
use crate::error::{BijiError, Result};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://open-api.biji.com/getnote/openapi";

const RECALL_ENDPOINT: &str = "/knowledge/search/recall";
const SEARCH_ENDPOINT: &str = "/knowledge/search/stream";

const TIMEOUT_MESSAGE: &str = "request timed out, retry later";

/// Environment flag enabling verbose request/response logging.
pub const DEBUG_ENV: &str = "BIJI_MCP_DEBUG";

/// Connection options for [`BijiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL the endpoint paths are appended to.
    pub base_url: String,
    /// Connect timeout, and the longest wait for any single read. A stream
    /// that keeps sending data is never cut off by it.
    pub timeout: Duration,
    /// Log request bodies, responses and stream fragments.
    pub verbose: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            verbose: false,
        }
    }
}

impl ClientOptions {
    /// Options derived from the configured settings.
    pub fn from_settings(settings: &Settings, verbose: bool) -> Self {
        Self {
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(settings.timeout),
            verbose,
        }
    }

    /// Whether the `BIJI_MCP_DEBUG` flag is set in the environment.
    pub fn verbose_from_env() -> bool {
        std::env::var(DEBUG_ENV).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }
}

/// Parameters for [`BijiClient::recall`].
#[derive(Debug, Clone)]
pub struct RecallRequest {
    pub question: String,
    pub topic_id: String,
    pub top_k: u32,
    pub intent_rewrite: bool,
    pub select_matrix: bool,
}

impl RecallRequest {
    pub fn new(question: impl Into<String>, topic_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            topic_id: topic_id.into(),
            top_k: 10,
            intent_rewrite: false,
            select_matrix: false,
        }
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_intent_rewrite(mut self, intent_rewrite: bool) -> Self {
        self.intent_rewrite = intent_rewrite;
        self
    }

    pub fn with_select_matrix(mut self, select_matrix: bool) -> Self {
        self.select_matrix = select_matrix;
        self
    }
}

/// Parameters for [`BijiClient::search`].
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub question: String,
    pub topic_id: String,
    /// Ask the API for chain-of-thought output.
    pub deep_seek: bool,
    /// Ask the API for citations.
    pub refs: bool,
}

impl SearchRequest {
    pub fn new(question: impl Into<String>, topic_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            topic_id: topic_id.into(),
            deep_seek: false,
            refs: true,
        }
    }

    pub fn with_deep_seek(mut self, deep_seek: bool) -> Self {
        self.deep_seek = deep_seek;
        self
    }

    pub fn with_refs(mut self, refs: bool) -> Self {
        self.refs = refs;
        self
    }
}

#[derive(Debug, Serialize)]
struct RecallBody<'a> {
    question: &'a str,
    topic_ids: [&'a str; 1],
    top_k: u32,
    intent_rewrite: bool,
    select_matrix: bool,
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    question: &'a str,
    topic_ids: [&'a str; 1],
    deep_seek: bool,
    refs: bool,
}

/// API client bound to one knowledge base token.
pub struct BijiClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    timeout: Duration,
    verbose: bool,
}

impl BijiClient {
    /// Create a client with custom options.
    pub fn with_options(token: impl Into<String>, options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(options.timeout)
            .build()
            .map_err(|e| BijiError::InvalidInput(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            token: token.into(),
            base_url: options.base_url.trim_end_matches('/').to_string(),
            timeout: options.timeout,
            verbose: options.verbose,
        })
    }

    /// Recall raw snippets from a knowledge base.
    ///
    /// A success response without a `data.results` array yields an empty list.
    #[instrument(skip(self, request), fields(topic_id = %request.topic_id))]
    pub async fn recall(&self, request: &RecallRequest) -> Result<Vec<RecallRecord>> {
        let body = RecallBody {
            question: &request.question,
            topic_ids: [request.topic_id.as_str()],
            top_k: request.top_k,
            intent_rewrite: request.intent_rewrite,
            select_matrix: request.select_matrix,
        };

        let response = self.post(RECALL_ENDPOINT, &body).await?;
        let text = self.bounded(response.text()).await?;

        let data: Value = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                warn!("Recall response is not JSON, treating as empty: {}", e);
                return Ok(Vec::new());
            }
        };

        if self.verbose {
            info!("API response: {}", data);
        }

        Ok(decode_recall(&data))
    }

    /// Ask the knowledge base a question and collect the streamed answer.
    ///
    /// Reading stops at the completion event; the connection is dropped then.
    #[instrument(skip(self, request), fields(topic_id = %request.topic_id))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let body = SearchBody {
            question: &request.question,
            topic_ids: [request.topic_id.as_str()],
            deep_seek: request.deep_seek,
            refs: request.refs,
        };

        let response = self.post(SEARCH_ENDPOINT, &body).await?;
        let mut lines = LineStream::new(Box::pin(response.bytes_stream()));
        let mut decoder = StreamDecoder::new().with_verbose(self.verbose);

        while let Some(line) = self.bounded(lines.next_line()).await? {
            if decoder.push_line(&line) == Flow::Done {
                break;
            }
        }
        drop(lines);

        let outcome = decoder.finish();
        debug!(
            "Search finished: {} answer chars, {} references",
            outcome.answer.chars().count(),
            outcome.references.len()
        );
        Ok(outcome)
    }

    /// POST a JSON body and apply the shared failure mapping.
    async fn post<B: Serialize + std::fmt::Debug>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, endpoint);

        if self.verbose {
            info!("API request: {}, body={:?}", endpoint, body);
        }

        let request = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body);

        let response = self.bounded(request.send()).await?;
        self.check_status(response).await
    }

    /// Await one network step, failing with the timeout error if it stays
    /// silent for longer than the configured timeout.
    async fn bounded<T, F>(&self, step: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, reqwest::Error>>,
    {
        match tokio::time::timeout(self.timeout, step).await {
            Ok(result) => result.map_err(transport_error),
            Err(_) => Err(BijiError::api(0, TIMEOUT_MESSAGE)),
        }
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status().as_u16();
        match status {
            401 => Err(BijiError::api(401, "invalid token, check configuration")),
            429 => Err(BijiError::api(
                429,
                "rate limit exceeded (2 requests/sec), retry later",
            )),
            code if code >= 400 => {
                let body = self.bounded(response.text()).await?;
                Err(BijiError::api(code, body))
            }
            _ => Ok(response),
        }
    }
}

/// Pull `data.results` out of a recall response.
pub fn decode_recall(data: &Value) -> Vec<RecallRecord> {
    data.get("data")
        .and_then(|d| d.get("results"))
        .and_then(Value::as_array)
        .map(|results| results.iter().map(RecallRecord::from_api).collect())
        .unwrap_or_default()
}

fn transport_error(e: reqwest::Error) -> BijiError {
    if e.is_timeout() {
        BijiError::api(0, TIMEOUT_MESSAGE)
    } else {
        BijiError::api(0, format!("network error: {}", e))
    }
}
