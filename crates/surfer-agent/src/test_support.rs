//! Scripted collaborators shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use surfer_ai::{ChatProvider, CompletionEvent, CompletionStream, Message, ProviderConfig};

use crate::browser::{Browser, BrowserError, BrowserResult};
use crate::handle::SessionHandle;

pub(crate) fn test_config() -> ProviderConfig {
    ProviderConfig::new("http://localhost:1", "test-key", "test-model")
}

/// What a scripted stream call produces
pub(crate) enum StreamScript {
    /// Emit these deltas, then finish
    Chunks(Vec<String>),
    /// Emit these deltas, then stall forever
    Stall(Vec<String>),
    /// Emit these deltas, then report a mid-stream error
    Break(Vec<String>, String),
    /// Fail to open the stream
    Fail(surfer_ai::Error),
    /// Never finish opening the stream
    Hang,
}

/// A provider that replays canned replies and records every request.
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<surfer_ai::Result<String>>>,
    streams: Mutex<VecDeque<StreamScript>>,
    fallback: String,
    hang_when_empty: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<Message>>>,
    cancel_after_call: Mutex<Option<(usize, SessionHandle)>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            streams: Mutex::new(VecDeque::new()),
            fallback: "done".into(),
            hang_when_empty: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            cancel_after_call: Mutex::new(None),
        }
    }

    /// Reply used once the scripted replies run out
    pub(crate) fn with_fallback(mut self, reply: &str) -> Self {
        self.fallback = reply.to_string();
        self
    }

    /// Once the scripted replies run out, `complete` never returns
    pub(crate) fn hanging(mut self) -> Self {
        self.hang_when_empty = true;
        self
    }

    pub(crate) fn with_error(self, error: surfer_ai::Error) -> Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    pub(crate) fn with_stream(self, script: StreamScript) -> Self {
        self.streams.lock().push_back(script);
        self
    }

    /// Cancel the session's current call right after the `n`th call (1-based)
    pub(crate) fn cancel_after(&self, n: usize, handle: SessionHandle) {
        *self.cancel_after_call.lock() = Some((n, handle));
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().clone()
    }

    fn record(&self, messages: &[Message]) {
        self.requests.lock().push(messages.to_vec());
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((at, handle)) = self.cancel_after_call.lock().as_ref() {
            if *at == n {
                handle.cancel();
            }
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn complete(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
    ) -> surfer_ai::Result<String> {
        config.validate()?;
        self.record(messages);
        let next = self.replies.lock().pop_front();
        match next {
            Some(reply) => reply,
            None if self.hang_when_empty => futures::future::pending().await,
            None => Ok(self.fallback.clone()),
        }
    }

    async fn stream(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
    ) -> surfer_ai::Result<CompletionStream> {
        config.validate()?;
        self.record(messages);
        let script = self
            .streams
            .lock()
            .pop_front()
            .unwrap_or_else(|| StreamScript::Chunks(vec![self.fallback.clone()]));

        let (chunks, stall, failure) = match script {
            StreamScript::Chunks(chunks) => (chunks, false, None),
            StreamScript::Stall(chunks) => (chunks, true, None),
            StreamScript::Break(chunks, message) => (chunks, false, Some(message)),
            StreamScript::Fail(e) => return Err(e),
            StreamScript::Hang => return futures::future::pending().await,
        };

        Ok(Box::pin(async_stream::stream! {
            for text in chunks {
                yield CompletionEvent::Delta { text };
            }
            if stall {
                futures::future::pending::<()>().await;
            }
            match failure {
                Some(message) => yield CompletionEvent::Error { message },
                None => yield CompletionEvent::Done,
            }
        }))
    }
}

/// A browser that records every call as a short string.
#[derive(Default)]
pub(crate) struct RecordingBrowser {
    calls: Mutex<Vec<String>>,
    page: String,
    failure: Option<BrowserError>,
}

impl RecordingBrowser {
    pub(crate) fn with_page(page: &str) -> Self {
        Self {
            page: page.to_string(),
            ..Default::default()
        }
    }

    /// Every operation fails with `error`
    pub(crate) fn failing(error: BrowserError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> BrowserResult<()> {
        self.calls.lock().push(call);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Browser for RecordingBrowser {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.record(format!("navigate:{}", url))
    }

    async fn search(&self, query: &str) -> BrowserResult<()> {
        self.record(format!("search:{}", query))
    }

    async fn search_on_site(&self, query: &str, site: &str) -> BrowserResult<()> {
        self.record(format!("search_on_site:{}@{}", query, site))
    }

    async fn new_tab(&self, url: Option<&str>) -> BrowserResult<()> {
        self.record(format!("new_tab:{}", url.unwrap_or("")))
    }

    async fn close_current_tab(&self) -> BrowserResult<()> {
        self.record("close_tab".into())
    }

    async fn go_back(&self) -> BrowserResult<()> {
        self.record("back".into())
    }

    async fn go_forward(&self) -> BrowserResult<()> {
        self.record("forward".into())
    }

    async fn refresh(&self) -> BrowserResult<()> {
        self.record("refresh".into())
    }

    async fn scroll(&self, delta_y: i32) -> BrowserResult<()> {
        self.record(format!("scroll:{}", delta_y))
    }

    async fn read_page(&self) -> BrowserResult<String> {
        self.record("read_page".into())?;
        Ok(self.page.clone())
    }

    async fn click_element(&self, selector: &str) -> BrowserResult<()> {
        self.record(format!("click:{}", selector))
    }

    async fn click_element_by_id(&self, id: u32) -> BrowserResult<()> {
        self.record(format!("click_id:{}", id))
    }

    async fn type_text(&self, selector: &str, text: &str) -> BrowserResult<()> {
        self.record(format!("type:{}={}", selector, text))
    }

    async fn type_text_by_id(&self, id: u32, text: &str) -> BrowserResult<()> {
        self.record(format!("type_id:{}={}", id, text))
    }
}
