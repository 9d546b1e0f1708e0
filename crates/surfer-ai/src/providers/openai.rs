//! OpenAI-compatible Chat Completions provider

use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource, retry::Never};
use serde::{Deserialize, Serialize};

use super::ChatProvider;
use crate::{
    error::{Error, Result},
    stream::{CompletionEvent, CompletionStream, SseFrame, decode_data},
    types::{Message, ProviderConfig},
};

/// Whole-response requests give up after this long
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection establishment limit, applied to streamed requests as well
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for any backend that speaks `POST /chat/completions`
#[derive(Clone)]
pub struct OpenAICompatProvider {
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    /// Create a provider with the default HTTP client settings
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self { client }
    }

    /// Create a provider around an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_request(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
        stream: bool,
    ) -> Result<reqwest::RequestBuilder> {
        config.validate()?;

        let url = config.completions_url();
        tracing::debug!(
            "POST {} (model: {}, messages: {}, stream: {})",
            url,
            config.model_name,
            messages.len(),
            stream
        );

        let body = ChatRequest {
            model: &config.model_name,
            messages,
            stream,
        };

        Ok(self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&body))
    }
}

impl Default for OpenAICompatProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for OpenAICompatProvider {
    async fn complete(&self, config: &ProviderConfig, messages: &[Message]) -> Result<String> {
        let response = self
            .build_request(config, messages, false)?
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::protocol(status.as_u16(), body));
        }

        parse_completion(&body)
    }

    async fn stream(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
    ) -> Result<CompletionStream> {
        let request_builder = self.build_request(config, messages, true)?;

        let mut event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;
        event_source.set_retry_policy(Box::new(Never));

        // Surface HTTP-level failures to the caller before any event is handed out.
        match event_source.next().await {
            Some(Ok(Event::Open)) => {}
            Some(Ok(Event::Message(msg))) => {
                let first = decode_data(&msg.data);
                return Ok(Box::pin(create_stream(event_source, Some(first))));
            }
            Some(Err(reqwest_eventsource::Error::InvalidStatusCode(status, response))) => {
                event_source.close();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::protocol(status.as_u16(), body));
            }
            Some(Err(reqwest_eventsource::Error::InvalidContentType(_, response))) => {
                // Backend ignored `stream: true` and answered with a whole completion.
                event_source.close();
                let status = response.status();
                let body = response.text().await?;
                if !status.is_success() {
                    return Err(Error::protocol(status.as_u16(), body));
                }
                let text = parse_completion(&body)?;
                return Ok(Box::pin(single_shot(text)));
            }
            Some(Err(reqwest_eventsource::Error::Transport(e))) => {
                event_source.close();
                return Err(Error::Transport(e));
            }
            Some(Err(e)) => {
                event_source.close();
                return Err(Error::Sse(e.to_string()));
            }
            None => return Err(Error::Sse("stream closed before it opened".to_string())),
        }

        Ok(Box::pin(create_stream(event_source, None)))
    }
}

/// Extract `choices[0].message.content` from a whole completion body
fn parse_completion(body: &str) -> Result<String> {
    let parsed: CompletionResponse = serde_json::from_str(body)?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse("response has no choices".to_string()))?;
    let message = choice
        .message
        .ok_or_else(|| Error::UnexpectedResponse("choice has no message".to_string()))?;
    Ok(message.content.unwrap_or_default())
}

fn create_stream(
    mut event_source: EventSource,
    first: Option<SseFrame>,
) -> impl futures::Stream<Item = CompletionEvent> {
    stream! {
        let mut pending = first;

        loop {
            let frame = match pending.take() {
                Some(frame) => frame,
                None => match event_source.next().await {
                    Some(Ok(Event::Open)) => continue,
                    Some(Ok(Event::Message(msg))) => decode_data(&msg.data),
                    Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => break,
                    Some(Err(e)) => {
                        event_source.close();
                        yield CompletionEvent::Error {
                            message: format!("Stream error: {}", e),
                        };
                        return;
                    }
                },
            };

            match frame {
                SseFrame::Done => break,
                SseFrame::Delta(text) => yield CompletionEvent::Delta { text },
                SseFrame::Empty => {}
                SseFrame::Malformed(e) => {
                    tracing::debug!("Skipping malformed stream chunk: {}", e);
                }
            }
        }

        event_source.close();
        yield CompletionEvent::Done;
    }
}

fn single_shot(text: String) -> impl futures::Stream<Item = CompletionEvent> {
    stream! {
        if !text.is_empty() {
            yield CompletionEvent::Delta { text };
        }
        yield CompletionEvent::Done;
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}
