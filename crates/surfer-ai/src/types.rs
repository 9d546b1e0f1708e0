//! Core types for chat-completion requests

use serde::{Deserialize, Serialize};

use crate::endpoint;
use crate::error::{Error, Result};

/// Message roles understood by OpenAI-compatible backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Get the wire name of this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a message with an explicit role
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Connection settings for a chat-completion backend.
///
/// Read as a snapshot at the start of every call, so edits made by the host
/// between calls take effect on the next request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL as entered by the user, e.g. `https://api.deepseek.com/v1`
    pub base_url: String,
    /// Bearer token sent with every request
    pub api_key: String,
    /// Model identifier placed in the request body
    pub model_name: String,
}

impl ProviderConfig {
    /// Create a new provider configuration
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model_name: model_name.into(),
        }
    }

    /// Check that the settings needed to issue a request are present
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::missing("API key"));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::missing("API base URL"));
        }
        Ok(())
    }

    /// Full chat-completions URL after vendor normalization
    pub fn completions_url(&self) -> String {
        endpoint::completions_url(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_as_wire_object() {
        let json = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn test_role_roundtrip_names() {
        let msg: Message = serde_json::from_str(r#"{"role":"system","content":"x"}"#).unwrap();
        assert!(msg.is_system());
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn test_validate_missing_key() {
        let cfg = ProviderConfig::new("https://api.example.com/v1", "", "m");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_validate_blank_base_url() {
        let cfg = ProviderConfig::new("   ", "sk-1", "m");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("base URL"));
    }

    #[test]
    fn test_validate_ok() {
        let cfg = ProviderConfig::new("https://api.example.com/v1", "sk-1", "m");
        assert!(cfg.validate().is_ok());
    }
}
