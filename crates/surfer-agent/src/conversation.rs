//! Conversation state: ordered history plus a rolling summary.

use surfer_ai::{Message, Role};

/// Prefix that marks a user-role message as system feedback rather than
/// something the end user typed.
pub const OBSERVATION_PREFIX: &str = "Observation (system feedback): ";

/// Header of the system message that carries the rolling summary.
pub const SUMMARY_HEADER: &str =
    "[Task summary] The earlier conversation is summarized below; continue the task from it:\n";

/// Conversation state owned by one session.
///
/// `history[0]` is always the system prompt. The summary starts empty and only
/// grows through [`Conversation::merge_summary`] until [`Conversation::reset`].
#[derive(Debug, Clone)]
pub struct Conversation {
    history: Vec<Message>,
    summary: String,
}

impl Conversation {
    /// Start a conversation with the given system prompt
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            history: vec![Message::system(system_prompt)],
            summary: String::new(),
        }
    }

    /// The system prompt at the head of the history
    pub fn system_prompt(&self) -> &str {
        &self.history[0].content
    }

    /// All stored messages, system prompt first
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The rolling summary (empty until the first compaction)
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Number of stored messages, including the system prompt
    pub fn message_count(&self) -> usize {
        self.history.len()
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.history.push(Message::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.history.push(Message::assistant(text));
    }

    /// Record the result of executed commands as feedback for the model
    pub fn append_observation(&mut self, text: &str) {
        self.history
            .push(Message::user(format!("{}{}", OBSERVATION_PREFIX, text)));
    }

    /// Messages for the next tool-mode request: the system prompt, the summary
    /// as a second system message when present, then the rest of the history.
    pub fn build_request_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(self.history[0].clone());
        if !self.summary.is_empty() {
            messages.push(Message::system(format!("{}{}", SUMMARY_HEADER, self.summary)));
        }
        messages.extend(self.history[1..].iter().cloned());
        messages
    }

    /// The last `n` non-system messages, oldest first
    pub fn recent_dialogue(&self, n: usize) -> Vec<Message> {
        let dialogue: Vec<&Message> = self
            .history
            .iter()
            .filter(|m| m.role != Role::System)
            .collect();
        let skip = dialogue.len().saturating_sub(n);
        dialogue.into_iter().skip(skip).cloned().collect()
    }

    /// Messages strictly between the system prompt and the last `keep`
    pub fn compactable(&self, keep: usize) -> &[Message] {
        let end = self.history.len().saturating_sub(keep).max(1);
        &self.history[1..end]
    }

    /// Merge a newly generated summary into the rolling one.
    ///
    /// Earlier stages are kept verbatim and labelled; nothing is overwritten.
    pub fn merge_summary(&mut self, new_summary: &str) {
        if self.summary.is_empty() {
            self.summary = new_summary.to_string();
        } else {
            self.summary = format!(
                "Previous stage: {}\nNew stage: {}",
                self.summary, new_summary
            );
        }
    }

    /// Truncate to the system prompt plus the last `keep` messages.
    /// Returns how many messages were removed.
    pub fn retain_recent(&mut self, keep: usize) -> usize {
        let removable = self.history.len().saturating_sub(keep + 1);
        if removable > 0 {
            self.history.drain(1..1 + removable);
        }
        removable
    }

    /// Start a new session: drop all dialogue and the summary, keep the prompt
    pub fn reset(&mut self) {
        self.history.truncate(1);
        self.summary.clear();
    }
}
