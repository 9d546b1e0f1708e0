//! History compaction for long tool-mode runs
//!
//! When the history grows past a threshold, the older middle part is
//! summarized by the model, the summary is merged into the conversation's
//! rolling summary, and only the system prompt plus the most recent messages
//! are kept.

use surfer_ai::{ChatProvider, Message, ProviderConfig};

use crate::conversation::Conversation;

/// Instruction appended to the slice being summarized
pub const SUMMARY_INSTRUCTION: &str = "Briefly summarize the user's goal in the conversation above, \
the steps already completed and the current state of the task. Keep key facts and skip small talk.";

/// Configuration for history compaction
#[derive(Debug, Clone)]
pub struct CompactionConfig {
    /// Compact on loop entry when the history is longer than this
    pub history_threshold: usize,
    /// Number of most recent messages kept verbatim
    pub keep_recent: usize,
    /// Compact at every step that is a multiple of this
    pub step_interval: u32,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            history_threshold: 21,
            keep_recent: 10,
            step_interval: 5,
        }
    }
}

impl CompactionConfig {
    /// Whether a run should compact before its first step
    pub fn due_on_entry(&self, history_len: usize) -> bool {
        history_len > self.history_threshold
    }

    /// Whether step `step` (1-based) should compact before calling the model
    pub fn due_at_step(&self, step: u32) -> bool {
        self.step_interval > 0 && step % self.step_interval == 0
    }
}

/// Result of a compaction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactionOutcome {
    /// History was summarized and truncated
    Compacted { removed: usize, summary_len: usize },
    /// Nothing to do, or the provider is not configured
    Skipped,
    /// The summarization call failed; the conversation is unchanged
    Failed(String),
}

/// Summarize the older part of `conversation` and truncate it.
///
/// Never fails the caller: errors are logged and reported as
/// [`CompactionOutcome::Failed`] with the conversation left untouched.
pub async fn compact(
    conversation: &mut Conversation,
    provider: &dyn ChatProvider,
    provider_config: &ProviderConfig,
    config: &CompactionConfig,
) -> CompactionOutcome {
    if conversation.message_count() <= config.keep_recent + 2 {
        return CompactionOutcome::Skipped;
    }
    if provider_config.validate().is_err() {
        tracing::debug!("Skipping compaction: provider is not configured");
        return CompactionOutcome::Skipped;
    }

    let slice = conversation.compactable(config.keep_recent);
    if slice.is_empty() {
        return CompactionOutcome::Skipped;
    }

    let mut request: Vec<Message> = slice.to_vec();
    request.push(Message::user(SUMMARY_INSTRUCTION));

    tracing::info!(messages = slice.len(), "Summarizing older history");

    match provider.complete(provider_config, &request).await {
        Ok(summary) if summary.trim().is_empty() => {
            tracing::warn!("Compaction returned an empty summary; history kept");
            CompactionOutcome::Failed("empty summary".into())
        }
        Ok(summary) => {
            conversation.merge_summary(summary.trim());
            let removed = conversation.retain_recent(config.keep_recent);
            let summary_len = conversation.summary().chars().count();
            tracing::info!(removed, summary_len, "History compacted");
            CompactionOutcome::Compacted {
                removed,
                summary_len,
            }
        }
        Err(e) => {
            tracing::warn!("Compaction failed: {}", e);
            CompactionOutcome::Failed(e.to_string())
        }
    }
}
