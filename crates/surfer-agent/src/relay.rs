//! Streaming chat mode: relay provider deltas to subscribers as they arrive.

use futures::StreamExt;
use surfer_ai::{ChatProvider, CompletionEvent, Message, ProviderConfig};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::conversation::Conversation;
use crate::events::StreamEvent;
use crate::prompts::{CANCELLED_MESSAGE, CHAT_SYSTEM_PROMPT, STREAMING_SENTINEL};

/// How many recent dialogue messages accompany a chat request
pub const CHAT_CONTEXT_MESSAGES: usize = 20;

/// Fans chat-mode stream events out to any number of subscribers
pub struct StreamRelay {
    event_tx: broadcast::Sender<StreamEvent>,
}

impl StreamRelay {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self { event_tx }
    }

    /// Subscribe to stream events
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: StreamEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Send `message` in chat mode and relay the reply as events.
    ///
    /// Returns [`STREAMING_SENTINEL`] when the reply went out as events,
    /// [`CANCELLED_MESSAGE`] if cancelled before the stream opened, or the
    /// error text if the provider failed.
    ///
    /// A token that is already cancelled short-circuits: no request, no
    /// events, and the history is left as it was. Cancelling while the stream
    /// is opening keeps the user message and emits only `Done`.
    pub async fn relay(
        &self,
        conversation: &mut Conversation,
        provider: &dyn ChatProvider,
        config: &ProviderConfig,
        message: &str,
        cancel: &CancellationToken,
    ) -> String {
        if cancel.is_cancelled() {
            return CANCELLED_MESSAGE.to_string();
        }
        conversation.append_user(message);

        let mut request = vec![Message::system(CHAT_SYSTEM_PROMPT)];
        request.extend(conversation.recent_dialogue(CHAT_CONTEXT_MESSAGES));

        tracing::debug!(model = %config.model_name, "Chat mode request");

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.emit(StreamEvent::Done);
                return CANCELLED_MESSAGE.to_string();
            }
            opened = provider.stream(config, &request) => opened,
        };

        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                let text = format!("Error: {}", e);
                self.emit(StreamEvent::Error(text.clone()));
                self.emit(StreamEvent::Done);
                return text;
            }
        };

        self.emit(StreamEvent::Start);

        let mut reply = String::new();
        let mut failure = None;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Chat stream cancelled");
                    break;
                }
                next = stream.next() => next,
            };

            match next {
                Some(CompletionEvent::Delta { text }) => {
                    if text.is_empty() {
                        continue;
                    }
                    reply.push_str(&text);
                    self.emit(StreamEvent::Chunk(text));
                }
                Some(CompletionEvent::Error { message }) => {
                    let text = format!("Error: {}", message);
                    self.emit(StreamEvent::Error(text.clone()));
                    failure = Some(text);
                    break;
                }
                Some(CompletionEvent::Done) | None => break,
            }
        }

        if failure.is_none() || !reply.is_empty() {
            conversation.append_assistant(reply);
        }
        self.emit(StreamEvent::Done);

        failure.unwrap_or_else(|| STREAMING_SENTINEL.to_string())
    }
}

impl Default for StreamRelay {
    fn default() -> Self {
        Self::new()
    }
}
