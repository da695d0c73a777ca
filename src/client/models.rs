//! Records decoded from API responses.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Content type of a recalled snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub enum RecallKind {
    #[default]
    Note,
    File,
    Blogger,
    /// Any value the API adds later is kept verbatim.
    Other(String),
}

impl From<&str> for RecallKind {
    fn from(s: &str) -> Self {
        match s {
            "NOTE" => RecallKind::Note,
            "FILE" => RecallKind::File,
            "BLOGGER" => RecallKind::Blogger,
            other => RecallKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecallKind::Note => write!(f, "NOTE"),
            RecallKind::File => write!(f, "FILE"),
            RecallKind::Blogger => write!(f, "BLOGGER"),
            RecallKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// One raw snippet returned by the recall endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecallRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Relevance score as sent by the API, not clamped.
    pub score: f64,
    pub kind: RecallKind,
    /// Retrieval path, `embedding` or `keyword`.
    pub recall_source: String,
}

impl RecallRecord {
    /// Decode one element of `data.results`. Absent fields take their defaults
    /// instead of failing.
    pub fn from_api(data: &Value) -> Self {
        Self {
            id: str_field(data, "id", ""),
            title: str_field(data, "title", ""),
            content: str_field(data, "content", ""),
            score: data.get("score").and_then(Value::as_f64).unwrap_or(0.0),
            kind: data
                .get("type")
                .and_then(Value::as_str)
                .map(RecallKind::from)
                .unwrap_or_default(),
            recall_source: str_field(data, "recall_source", ""),
        }
    }
}

/// A reference backing an AI answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub title: String,
    pub content: String,
}

impl Citation {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Decode one element of a `refs` array.
    pub fn from_api(data: &Value) -> Self {
        Self {
            title: str_field(data, "title", ""),
            content: str_field(data, "content", ""),
        }
    }
}

/// Result of a streaming search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SearchOutcome {
    /// Answer fragments concatenated in arrival order.
    pub answer: String,
    /// Citations in arrival order.
    pub references: Vec<Citation>,
    /// Reasoning text, `None` when no reasoning fragment arrived at all.
    pub thinking: Option<String>,
}

fn str_field(data: &Value, key: &str, default: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recall_record_from_full_payload() {
        let record = RecallRecord::from_api(&json!({
            "id": "note_123",
            "title": "Weekly sync",
            "content": "Discussed the roadmap",
            "score": 0.85,
            "type": "FILE",
            "recall_source": "embedding"
        }));

        assert_eq!(record.id, "note_123");
        assert_eq!(record.title, "Weekly sync");
        assert_eq!(record.content, "Discussed the roadmap");
        assert!((record.score - 0.85).abs() < f64::EPSILON);
        assert_eq!(record.kind, RecallKind::File);
        assert_eq!(record.recall_source, "embedding");
    }

    #[test]
    fn test_recall_record_defaults() {
        let record = RecallRecord::from_api(&json!({"title": "Only a title"}));

        assert_eq!(record.id, "");
        assert_eq!(record.title, "Only a title");
        assert_eq!(record.content, "");
        assert_eq!(record.score, 0.0);
        assert_eq!(record.kind, RecallKind::Note);
        assert_eq!(record.recall_source, "");
    }

    #[test]
    fn test_recall_record_integer_score_and_unknown_type() {
        let record = RecallRecord::from_api(&json!({"score": 2, "type": "VIDEO"}));
        assert_eq!(record.score, 2.0);
        assert_eq!(record.kind, RecallKind::Other("VIDEO".to_string()));
        assert_eq!(record.kind.to_string(), "VIDEO");
    }

    #[test]
    fn test_citation_defaults() {
        assert_eq!(Citation::from_api(&json!({})), Citation::new("", ""));
        assert_eq!(
            Citation::from_api(&json!({"title": "T"})),
            Citation::new("T", "")
        );
    }
}
