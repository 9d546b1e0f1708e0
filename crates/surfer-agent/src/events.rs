//! Chat-mode stream events

use serde::{Deserialize, Serialize};

/// Events emitted while a chat-mode reply streams in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The reply started; emitted once before the first chunk
    Start,
    /// A non-empty piece of the reply
    Chunk(String),
    /// The reply finished (also after cancellation or an error)
    Done,
    /// The provider failed
    Error(String),
}

impl StreamEvent {
    /// Check if this is the last event of a reply
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }
}
