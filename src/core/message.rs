//! Chat message representation.
//!
//! Messages are what the backend stores per session and what the chat log
//! renders. The assistant reply that is being streamed is an ordinary
//! [`ChatMessage`] with [`Role::Assistant`] whose content is replaced in
//! place as stream events arrive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat message.
///
/// The backend stores assistant turns with the role `"AI"`; `"assistant"`
/// is accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Message typed by the user.
    #[serde(rename = "user")]
    User,

    /// Message produced by the backend.
    #[serde(rename = "AI", alias = "assistant", alias = "ai")]
    Assistant,
}

impl Role {
    /// Returns the lowercase display label for this role.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single message in a chat session.
///
/// # Examples
///
/// ```
/// use ragchat::core::{ChatMessage, Role};
///
/// let msg = ChatMessage::user(1, "What is RAG?");
/// assert_eq!(msg.role, Role::User);
/// assert_eq!(msg.content, "What is RAG?");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Identifier assigned by the chat log (not stored by the backend).
    #[serde(default)]
    pub id: u64,

    /// Author of the message.
    pub role: Role,

    /// Message text.
    pub content: String,

    /// Source documents attached to an assistant reply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,

    /// Server-side timestamp, as returned by the history endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatMessage {
    /// Creates a message with the given role.
    #[must_use]
    pub fn new(id: u64, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            sources: Vec::new(),
            timestamp: None,
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(id: u64, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(id: u64, content: impl Into<String>) -> Self {
        Self::new(id, Role::Assistant, content)
    }

    /// Returns true if this message was written by the assistant.
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"AI\"");

        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Assistant);
        let role: Role = serde_json::from_str("\"AI\"").unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_history_entry_deserializes() {
        let json = r#"{"role":"AI","content":"Hello","timestamp":"Wed, 16 Oct 2024 10:00:00 GMT"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, 0);
        assert!(msg.is_assistant());
        assert_eq!(msg.timestamp.as_deref(), Some("Wed, 16 Oct 2024 10:00:00 GMT"));
        assert!(msg.sources.is_empty());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let msg = ChatMessage::user(7, "hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("sources"));
        assert!(!json.contains("timestamp"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
