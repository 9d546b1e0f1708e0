//! Browser session: the ReAct tool loop and the streaming chat mode.

use std::sync::Arc;

use surfer_ai::{ChatProvider, ProviderConfig};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::browser::Browser;
use crate::compaction::{self, CompactionConfig};
use crate::conversation::Conversation;
use crate::events::StreamEvent;
use crate::executor::CommandExecutor;
use crate::handle::SessionHandle;
use crate::parser::parse_commands;
use crate::prompts::{CANCELLED_MESSAGE, TOOL_SYSTEM_PROMPT, UNKNOWN_MODEL};
use crate::relay::StreamRelay;
use crate::settings::SettingsSource;

/// Tool-mode steps allowed per call
pub const DEFAULT_MAX_STEPS: u32 = 15;

/// Chat-template tokens some backends leak into replies
const CONTROL_TOKENS: [&str; 3] = ["<|endoftext|>", "<|im_end|>", "<|im_start|>"];

/// How a call is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// ReAct loop that may drive the browser
    #[default]
    Tool,
    /// Plain streamed conversation
    Chat,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool" => Ok(Mode::Tool),
            "chat" => Ok(Mode::Chat),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// How a tool-mode run ended
#[derive(Debug)]
pub enum LoopOutcome {
    /// The model answered without asking for more commands
    Done(String),
    /// The run was cancelled
    Cancelled,
    /// The step budget ran out before the model finished
    StepBudgetExhausted {
        steps: u32,
        summary: String,
        last_response: String,
    },
    /// Configuration, transport or protocol failure
    Failed(surfer_ai::Error),
}

impl LoopOutcome {
    /// Render the outcome as the text shown to the user
    pub fn into_text(self) -> String {
        match self {
            LoopOutcome::Done(text) => text,
            LoopOutcome::Cancelled => CANCELLED_MESSAGE.to_string(),
            LoopOutcome::StepBudgetExhausted {
                steps,
                summary,
                last_response,
            } => format!(
                "Executed {} steps without finishing. Current summary:\n{}\n\nLast response:\n{}",
                steps, summary, last_response
            ),
            LoopOutcome::Failed(e) => crate::Error::from(e).user_message(),
        }
    }
}

/// Remove leaked chat-template tokens and surrounding whitespace
pub fn strip_control_tokens(text: &str) -> String {
    let mut cleaned = text.to_string();
    for token in CONTROL_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    cleaned.trim().to_string()
}

/// One conversation between a user and the model, optionally driving a browser.
///
/// Calls take `&mut self`, so a session runs at most one call at a time.
/// Use [`BrowserSession::handle`] to cancel from another task.
pub struct BrowserSession {
    conversation: Conversation,
    provider: Arc<dyn ChatProvider>,
    settings: Arc<dyn SettingsSource>,
    executor: Option<CommandExecutor>,
    compaction: CompactionConfig,
    max_steps: u32,
    relay: StreamRelay,
    handle: SessionHandle,
}

impl BrowserSession {
    /// Create a session without a browser; commands in replies are ignored
    pub fn new(provider: Arc<dyn ChatProvider>, settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            conversation: Conversation::new(TOOL_SYSTEM_PROMPT),
            provider,
            settings,
            executor: None,
            compaction: CompactionConfig::default(),
            max_steps: DEFAULT_MAX_STEPS,
            relay: StreamRelay::new(),
            handle: SessionHandle::new(),
        }
    }

    /// Attach the browser that parsed commands run against
    pub fn with_browser(self, browser: Arc<dyn Browser>) -> Self {
        self.with_executor(CommandExecutor::new(browser))
    }

    pub fn with_executor(mut self, executor: CommandExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_compaction(mut self, config: CompactionConfig) -> Self {
        self.compaction = config;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Replace the tool-mode system prompt. Clears the conversation.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.conversation = Conversation::new(prompt);
        self
    }

    /// Subscribe to chat-mode stream events
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.relay.subscribe()
    }

    /// Get a cloneable handle for cancelling from other tasks
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Cancel the in-flight call, if any
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Start over: drop the dialogue and the summary
    pub fn reset(&mut self) {
        self.conversation.reset();
    }

    /// The configured model name, or a placeholder when none is set
    pub fn current_model_name(&self) -> String {
        let name = self.settings.provider_config().model_name;
        if name.trim().is_empty() {
            UNKNOWN_MODEL.to_string()
        } else {
            name
        }
    }

    /// Handle one user message and return the text to show.
    ///
    /// In chat mode the reply is delivered through [`BrowserSession::subscribe`]
    /// and the return value is the streaming sentinel.
    pub async fn call_agent(&mut self, message: &str, mode: Mode) -> String {
        match mode {
            Mode::Tool => self.run_tool_mode(message).await.into_text(),
            Mode::Chat => self.run_chat_mode(message).await,
        }
    }

    /// Run the streaming chat mode for one message
    pub async fn run_chat_mode(&mut self, message: &str) -> String {
        let config = self.settings.provider_config();
        if let Err(e) = config.validate() {
            return crate::Error::from(e).user_message();
        }

        let guard = self.handle.begin_run();
        self.relay
            .relay(
                &mut self.conversation,
                self.provider.as_ref(),
                &config,
                message,
                &guard.token,
            )
            .await
    }

    /// Run the ReAct loop for one message
    pub async fn run_tool_mode(&mut self, message: &str) -> LoopOutcome {
        let config = self.settings.provider_config();
        if let Err(e) = config.validate() {
            return LoopOutcome::Failed(e);
        }

        let guard = self.handle.begin_run();
        tracing::debug!(model = %config.model_name, "Tool mode request");
        self.tool_loop(message, &config, &guard.token).await
    }

    async fn tool_loop(
        &mut self,
        message: &str,
        config: &ProviderConfig,
        cancel: &CancellationToken,
    ) -> LoopOutcome {
        self.conversation.append_user(message);

        if self.compaction.due_on_entry(self.conversation.message_count()) {
            self.compact(config).await;
        }

        let mut step = 0u32;
        let mut last_response = String::new();

        while step < self.max_steps {
            if cancel.is_cancelled() {
                return LoopOutcome::Cancelled;
            }

            step += 1;
            tracing::debug!(step, "Agent step");

            if self.compaction.due_at_step(step) {
                self.compact(config).await;
            }

            let messages = self.conversation.build_request_messages();
            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => return LoopOutcome::Cancelled,
                reply = self.provider.complete(config, &messages) => reply,
            };

            let text = match reply {
                Ok(text) => strip_control_tokens(&text),
                Err(e) => {
                    tracing::warn!(step, kind = ?e.kind(), "Provider call failed: {}", e);
                    return LoopOutcome::Failed(e);
                }
            };
            last_response = text.clone();
            self.conversation.append_assistant(text.clone());

            let Some(executor) = &self.executor else {
                return LoopOutcome::Done(text);
            };

            let commands = parse_commands(&text);
            if commands.is_empty() {
                return LoopOutcome::Done(text);
            }

            tracing::info!(step, count = commands.len(), "Executing browser commands");
            let report = executor.execute_all(&commands, cancel).await;
            if report.cancelled {
                return LoopOutcome::Cancelled;
            }
            self.conversation.append_observation(&report.observation);
        }

        tracing::warn!(steps = self.max_steps, "Step budget exhausted");
        LoopOutcome::StepBudgetExhausted {
            steps: self.max_steps,
            summary: self.conversation.summary().to_string(),
            last_response,
        }
    }

    async fn compact(&mut self, config: &ProviderConfig) {
        compaction::compact(
            &mut self.conversation,
            self.provider.as_ref(),
            config,
            &self.compaction,
        )
        .await;
    }
}
