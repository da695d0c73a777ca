//! Decoding of the streaming search response.
//!
//! The search endpoint answers with `data: {json}` lines. Each payload carries a
//! `msg_type` discriminant:
//!
//! | msg_type | meaning            |
//! |----------|--------------------|
//! | 1        | answer fragment    |
//! | 21       | reasoning fragment |
//! | 105      | citation batch     |
//! | 3        | stream complete    |
//!
//! [`StreamDecoder`] is a synchronous state machine fed one line at a time;
//! [`LineStream`] pulls lines off a byte stream so the caller can stop reading
//! as soon as the decoder is done.

use super::models::{Citation, SearchOutcome};
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, trace};

const DATA_PREFIX: &str = "data: ";

const MSG_ANSWER: i64 = 1;
const MSG_DONE: i64 = 3;
const MSG_REASONING: i64 = 21;
const MSG_REFERENCES: i64 = 105;

/// Whether the decoder wants more input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Done,
}

/// Incremental decoder for search stream lines.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    answer: String,
    thinking: Option<String>,
    references: Vec<Citation>,
    done: bool,
    verbose: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every decoded fragment at debug level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Feed one line. Lines without the `data: ` prefix and payloads that are
    /// not valid JSON are skipped. Once the completion event was seen every
    /// further line is ignored.
    pub fn push_line(&mut self, line: &str) -> Flow {
        if self.done {
            return Flow::Done;
        }

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return Flow::Continue;
        };

        let event: Value = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                trace!("Skipping undecodable stream line: {}", e);
                return Flow::Continue;
            }
        };

        match event.get("msg_type").and_then(Value::as_i64) {
            Some(MSG_ANSWER) => {
                let content = content_of(&event);
                if self.verbose {
                    debug!("Answer fragment: {}", content);
                }
                self.answer.push_str(content);
            }
            Some(MSG_REASONING) => {
                let content = content_of(&event);
                if self.verbose {
                    debug!("Reasoning fragment: {}", content);
                }
                self.thinking
                    .get_or_insert_with(String::new)
                    .push_str(content);
            }
            Some(MSG_REFERENCES) => {
                let refs = event
                    .get("refs")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                if self.verbose {
                    debug!("References: {}", refs.len());
                }
                self.references.extend(refs.iter().map(Citation::from_api));
            }
            Some(MSG_DONE) => {
                if self.verbose {
                    debug!("Stream complete");
                }
                self.done = true;
                return Flow::Done;
            }
            _ => {}
        }

        Flow::Continue
    }

    /// Assemble the outcome from whatever was accumulated, whether or not the
    /// completion event arrived.
    pub fn finish(self) -> SearchOutcome {
        SearchOutcome {
            answer: self.answer,
            references: self.references,
            thinking: self.thinking,
        }
    }
}

/// Decode a complete sequence of lines, stopping at the completion event.
pub fn decode_lines<I, S>(lines: I) -> SearchOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoder = StreamDecoder::new();
    for line in lines {
        if decoder.push_line(line.as_ref()) == Flow::Done {
            break;
        }
    }
    decoder.finish()
}

fn content_of(event: &Value) -> &str {
    event.get("content").and_then(Value::as_str).unwrap_or("")
}

/// Pull-based line reader over a chunked byte stream.
///
/// Lines may span chunk boundaries; `\r\n` endings are accepted. A trailing
/// line without a newline is yielded when the stream ends. Dropping the reader
/// drops the underlying stream.
pub struct LineStream<S> {
    inner: S,
    buf: Vec<u8>,
    exhausted: bool,
}

impl<S, B, E> LineStream<S>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            exhausted: false,
        }
    }

    /// Next line, or `None` once the stream is finished.
    pub async fn next_line(&mut self) -> std::result::Result<Option<String>, E> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
                line.pop();
                return Ok(Some(into_line(line)));
            }

            if self.exhausted {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(into_line(std::mem::take(&mut self.buf))));
            }

            match self.inner.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => return Err(e),
                None => self.exhausted = true,
            }
        }
    }
}

fn into_line(mut bytes: Vec<u8>) -> String {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn test_answer_and_references() {
        let outcome = decode_lines([
            r#"data: {"msg_type":1,"content":"A"}"#,
            r#"data: {"msg_type":1,"content":"B"}"#,
            r#"data: {"msg_type":105,"refs":[{"title":"T","content":"C"}]}"#,
            r#"data: {"msg_type":3}"#,
        ]);

        assert_eq!(
            outcome,
            SearchOutcome {
                answer: "AB".to_string(),
                references: vec![Citation::new("T", "C")],
                thinking: None,
            }
        );
    }

    #[test]
    fn test_thinking_absent_vs_empty() {
        let outcome = decode_lines([r#"data: {"msg_type":1,"content":"x"}"#]);
        assert_eq!(outcome.thinking, None);

        let outcome = decode_lines([r#"data: {"msg_type":21,"content":""}"#]);
        assert_eq!(outcome.thinking, Some(String::new()));

        let outcome = decode_lines([r#"data: {"msg_type":21}"#]);
        assert_eq!(outcome.thinking, Some(String::new()));
    }

    #[test]
    fn test_thinking_fragments_concatenate() {
        let outcome = decode_lines([
            r#"data: {"msg_type":21,"content":"first "}"#,
            r#"data: {"msg_type":1,"content":"answer"}"#,
            r#"data: {"msg_type":21,"content":"second"}"#,
        ]);
        assert_eq!(outcome.thinking.as_deref(), Some("first second"));
        assert_eq!(outcome.answer, "answer");
    }

    #[test]
    fn test_noise_lines_are_skipped() {
        let outcome = decode_lines([
            "",
            ": keep-alive",
            "event: message",
            r#"data:{"msg_type":1,"content":"no space"}"#,
            "data: {not json",
            "data: ",
            r#"data: {"msg_type":1,"content":"ok"}"#,
            r#"data: {"msg_type":42,"content":"unknown"}"#,
            r#"data: {"content":"no type"}"#,
        ]);

        assert_eq!(outcome.answer, "ok");
        assert!(outcome.references.is_empty());
        assert_eq!(outcome.thinking, None);
    }

    #[test]
    fn test_done_truncates() {
        let outcome = decode_lines([
            r#"data: {"msg_type":1,"content":"kept"}"#,
            r#"data: {"msg_type":3}"#,
            r#"data: {"msg_type":1,"content":"dropped"}"#,
            r#"data: {"msg_type":105,"refs":[{"title":"late"}]}"#,
        ]);

        assert_eq!(outcome.answer, "kept");
        assert!(outcome.references.is_empty());
    }

    #[test]
    fn test_push_after_done_is_ignored() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.push_line(r#"data: {"msg_type":3}"#), Flow::Done);
        assert_eq!(
            decoder.push_line(r#"data: {"msg_type":1,"content":"late"}"#),
            Flow::Done
        );
        assert_eq!(decoder.finish().answer, "");
    }

    #[test]
    fn test_end_without_done_event() {
        let outcome = decode_lines([
            r#"data: {"msg_type":1,"content":"partial"}"#,
            r#"data: {"msg_type":105,"refs":[{"title":"a"},{"content":"b"}]}"#,
            r#"data: {"msg_type":105,"refs":[{"title":"c","content":"d"}]}"#,
        ]);

        assert_eq!(outcome.answer, "partial");
        assert_eq!(
            outcome.references,
            vec![
                Citation::new("a", ""),
                Citation::new("", "b"),
                Citation::new("c", "d"),
            ]
        );
    }

    #[test]
    fn test_empty_stream() {
        let outcome = decode_lines(Vec::<String>::new());
        assert_eq!(outcome, SearchOutcome::default());
    }

    #[tokio::test]
    async fn test_line_stream_joins_split_chunks() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"msg_".to_vec()),
            Ok(b"type\":1}\r\n\r\nda".to_vec()),
            Ok(b"ta: tail".to_vec()),
        ];
        let mut lines = LineStream::new(stream::iter(chunks));

        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("data: {\"msg_type\":1}")
        );
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("data: tail"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_stream_multibyte_across_chunks() {
        let text = "data: 知识\n".as_bytes();
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(text[..8].to_vec()), Ok(text[8..].to_vec())];
        let mut lines = LineStream::new(stream::iter(chunks));

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("data: 知识"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_stream_surfaces_errors() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"partial".to_vec()),
            Err(std::io::Error::other("reset")),
        ];
        let mut lines = LineStream::new(stream::iter(chunks));

        assert!(lines.next_line().await.is_err());
    }
}
