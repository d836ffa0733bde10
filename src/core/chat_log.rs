//! Ordered chat log for the current session.
//!
//! The log is append-only while a session is open. The assistant reply that
//! is being streamed occupies the last slot and is replaced in place as it
//! grows; it is never appended twice.

use super::message::{ChatMessage, Role};
use serde::Serialize;

/// Ordered sequence of chat messages with at most one live reply.
///
/// # Examples
///
/// ```
/// use ragchat::core::ChatLog;
///
/// let mut log = ChatLog::new();
/// log.push_user("Hello");
/// let id = log.begin_reply("Processing...");
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.live_id(), Some(id));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    #[serde(skip)]
    next_id: u64,
    #[serde(skip)]
    live: Option<u64>,
}

impl ChatLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            live: None,
        }
    }

    /// Builds a log from messages returned by the history endpoint.
    ///
    /// Ids are reassigned in order since the backend does not keep them.
    #[must_use]
    pub fn from_history(history: Vec<ChatMessage>) -> Self {
        let mut log = Self::new();
        for mut message in history {
            message.id = log.allocate_id();
            log.messages.push(message);
        }
        log
    }

    /// Appends a user message and returns it.
    pub fn push_user(&mut self, content: impl Into<String>) -> &ChatMessage {
        let id = self.allocate_id();
        self.messages.push(ChatMessage::user(id, content));
        &self.messages[self.messages.len() - 1]
    }

    /// Appends an assistant placeholder and marks it as the live reply.
    ///
    /// A previous live reply, if any, is finalized first.
    pub fn begin_reply(&mut self, placeholder: impl Into<String>) -> u64 {
        self.finalize_live();
        let id = self.allocate_id();
        self.messages.push(ChatMessage::assistant(id, placeholder));
        self.live = Some(id);
        id
    }

    /// Appends a complete assistant reply that is never live.
    ///
    /// A previous live reply, if any, is finalized first.
    pub fn push_reply(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.finalize_live();
        let id = self.allocate_id();
        self.messages.push(ChatMessage::assistant(id, content));
        &self.messages[self.messages.len() - 1]
    }

    /// Replaces the live reply with a newer state of the same message.
    ///
    /// Returns false (and leaves the log untouched) if there is no live
    /// reply or `message` is not it.
    pub fn update_live(&mut self, message: &ChatMessage) -> bool {
        match (self.live, self.messages.last_mut()) {
            (Some(live), Some(last)) if live == message.id && last.id == live => {
                last.clone_from(message);
                true
            }
            _ => false,
        }
    }

    /// Ends the live reply; later updates for it are rejected.
    pub fn finalize_live(&mut self) {
        self.live = None;
    }

    /// Id of the live reply, if a reply is streaming.
    #[must_use]
    pub const fn live_id(&self) -> Option<u64> {
        self.live
    }

    /// Returns the live reply, if any.
    #[must_use]
    pub fn live(&self) -> Option<&ChatMessage> {
        let live = self.live?;
        self.messages.last().filter(|m| m.id == live)
    }

    /// All messages in order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent message.
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The most recent assistant message.
    #[must_use]
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Checks if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_user_assigns_increasing_ids() {
        let mut log = ChatLog::new();
        let a = log.push_user("one").id;
        let b = log.push_user("two").id;
        assert!(b > a);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_default_log_allocates_nonzero_ids() {
        let mut log = ChatLog::default();
        assert_eq!(log.push_user("x").id, 1);
    }

    #[test]
    fn test_update_live_replaces_in_place() {
        let mut log = ChatLog::new();
        log.push_user("question");
        let id = log.begin_reply("Processing...");

        let mut updated = log.live().cloned().unwrap();
        updated.content = "Hello".to_string();
        assert!(log.update_live(&updated));

        updated.content = "Hello world".to_string();
        assert!(log.update_live(&updated));

        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().content, "Hello world");
        assert_eq!(log.live_id(), Some(id));
    }

    #[test]
    fn test_update_after_finalize_rejected() {
        let mut log = ChatLog::new();
        log.begin_reply("Processing...");
        let mut msg = log.live().cloned().unwrap();
        log.finalize_live();

        msg.content = "late".to_string();
        assert!(!log.update_live(&msg));
        assert_eq!(log.last().unwrap().content, "Processing...");
        assert!(log.live().is_none());
    }

    #[test]
    fn test_update_with_foreign_message_rejected() {
        let mut log = ChatLog::new();
        log.begin_reply("Processing...");
        let stranger = ChatMessage::assistant(999, "nope");
        assert!(!log.update_live(&stranger));
    }

    #[test]
    fn test_push_reply_is_final() {
        let mut log = ChatLog::new();
        log.push_user("question");
        let stale = log.begin_reply("Processing...");

        let reply = log.push_reply("Paris.");
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "Paris.");
        let id = reply.id;
        assert!(id > stale);

        assert!(log.live().is_none());
        assert_eq!(log.last_reply().map(|m| m.id), Some(id));

        let mut late = log.last().cloned().unwrap();
        late.content = "changed".to_string();
        assert!(!log.update_live(&late));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_from_history_reassigns_ids() {
        let history = vec![
            ChatMessage::user(0, "q"),
            ChatMessage::assistant(0, "a"),
        ];
        let mut log = ChatLog::from_history(history);
        assert_eq!(log.messages()[0].id, 1);
        assert_eq!(log.messages()[1].id, 2);
        assert_eq!(log.push_user("next").id, 3);
        assert_eq!(log.last_reply().unwrap().content, "a");
    }
}
