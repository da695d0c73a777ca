//! Error types for biji-mcp.

use thiserror::Error;

/// Library-level error type for biji-mcp operations.
#[derive(Error, Debug)]
pub enum BijiError {
    /// Missing, malformed or invalid configuration, or an unresolvable
    /// knowledge-base name.
    #[error("{0}")]
    Config(String),

    /// Failure talking to the remote API. `code` is the HTTP status, or 0 for
    /// transport-level failures.
    #[error("[{code}] {message}")]
    Api { code: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BijiError {
    pub(crate) fn api(code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Status code for API errors, `None` for every other kind.
    pub fn api_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Render the error the way tool responses show it, prefixed by category.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Configuration error: {}", msg),
            Self::Api { .. } => format!("API error: {}", self),
            other => format!("Internal error: {}", other),
        }
    }
}

/// Result type alias for biji-mcp operations.
pub type Result<T> = std::result::Result<T, BijiError>;
