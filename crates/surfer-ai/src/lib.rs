//! surfer-ai: OpenAI-compatible chat completion client
//!
//! This crate turns a provider configuration and a message list into a
//! chat-completion request, normalizing vendor-specific base URLs, and exposes
//! both whole-response and streamed modes behind the [`ChatProvider`] trait.

pub mod endpoint;
pub mod error;
pub mod providers;
pub mod stream;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use providers::{ChatProvider, OpenAICompatProvider};
pub use stream::{CompletionEvent, CompletionStream};
pub use types::*;
