//! Chat-completion provider implementations

pub mod openai;

use crate::{CompletionStream, Message, ProviderConfig, Result};
use async_trait::async_trait;

pub use openai::OpenAICompatProvider;

/// Trait for chat-completion backends.
///
/// The configuration is passed per call rather than captured at construction
/// so that a long-lived provider always uses the host's current settings.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Request a whole (non-streamed) completion and return its text
    async fn complete(&self, config: &ProviderConfig, messages: &[Message]) -> Result<String>;

    /// Request a streamed completion
    async fn stream(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
    ) -> Result<CompletionStream>;
}
