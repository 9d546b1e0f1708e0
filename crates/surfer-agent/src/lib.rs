//! surfer-agent: browser-driving agent runtime
//!
//! This crate provides the ReAct loop that lets a language model drive a
//! browser through a small command vocabulary, plus history compaction,
//! cooperative cancellation and a streaming chat mode.

pub mod agent;
pub mod browser;
pub mod command;
pub mod compaction;
pub mod conversation;
pub mod error;
pub mod events;
pub mod executor;
pub mod handle;
pub mod parser;
pub mod prompts;
pub mod relay;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use agent::{BrowserSession, LoopOutcome, Mode, strip_control_tokens};
pub use browser::{Browser, BrowserError, BrowserResult};
pub use command::{BrowserCommand, Target};
pub use compaction::{CompactionConfig, CompactionOutcome};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use events::StreamEvent;
pub use executor::{CommandExecutor, ExecutionReport};
pub use handle::SessionHandle;
pub use parser::parse_commands;
pub use prompts::{CANCELLED_MESSAGE, STREAMING_SENTINEL};
pub use relay::StreamRelay;
pub use settings::SettingsSource;
