//! Error types for surfer-ai

use thiserror::Error;

/// Result type alias using surfer-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], for callers that branch on the
/// failure category rather than on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Settings are incomplete; no request was sent
    Configuration,
    /// Connection, timeout or read failure
    Transport,
    /// The backend answered, but not with a usable completion
    Protocol,
    /// A response body could not be decoded
    Parse,
}

/// Errors that can occur when talking to a chat-completion backend
#[derive(Error, Debug)]
pub enum Error {
    /// API key or base URL missing
    #[error("{0} is not configured")]
    Configuration(String),

    /// HTTP request failed before a response was received
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server-sent events connection failed
    #[error("Stream error: {0}")]
    Sse(String),

    /// Non-success HTTP status, body preserved
    #[error("API error ({status}): {body}")]
    Protocol { status: u16, body: String },

    /// Response was valid JSON but had no completion in it
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a protocol error from an HTTP status and response body
    pub fn protocol(status: u16, body: impl Into<String>) -> Self {
        Self::Protocol {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error naming the missing setting
    pub fn missing(setting: impl Into<String>) -> Self {
        Self::Configuration(setting.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Transport(_) | Error::Sse(_) => ErrorKind::Transport,
            Error::Protocol { .. } | Error::UnexpectedResponse(_) => ErrorKind::Protocol,
            Error::Json(_) => ErrorKind::Parse,
        }
    }
}
