//! Streaming event types and SSE payload decoding

use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Literal payload that terminates an OpenAI-style event stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Events emitted while a streamed completion is read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionEvent {
    /// Incremental text
    Delta { text: String },
    /// The backend finished the completion
    Done,
    /// The stream failed; no further events follow
    Error { message: String },
}

impl CompletionEvent {
    /// Check if this is a terminal event (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, CompletionEvent::Done | CompletionEvent::Error { .. })
    }
}

/// A stream of completion events
pub type CompletionStream = Pin<Box<dyn Stream<Item = CompletionEvent> + Send>>;

/// Outcome of decoding one `data:` payload
#[derive(Debug)]
pub enum SseFrame {
    /// The terminator payload
    Done,
    /// A chunk carrying non-empty text
    Delta(String),
    /// A well-formed chunk with no text (role header, finish reason, usage)
    Empty,
    /// The payload was not valid chunk JSON
    Malformed(serde_json::Error),
}

/// Decode the payload of a single `data:` line.
pub fn decode_data(data: &str) -> SseFrame {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return SseFrame::Done;
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|text| !text.is_empty())
            .map(SseFrame::Delta)
            .unwrap_or(SseFrame::Empty),
        Err(e) => SseFrame::Malformed(e),
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}
