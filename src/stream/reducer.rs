//! Folding stream events into the assistant message.
//!
//! The reducer is pure: it takes a draft by value and returns the next
//! draft. The draft remembers whether a response part has been applied,
//! because the first part replaces the status placeholder and every later
//! part appends.

use super::event::StreamEvent;
use crate::core::ChatMessage;

/// Placeholder shown before the first status or response arrives.
pub const PROCESSING_TEXT: &str = "Processing...";

/// Content a reply is overwritten with when the transport fails.
pub const ERROR_TEXT: &str = "An error occurred while processing your request.";

/// The assistant message under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDraft {
    /// Current state of the message.
    pub message: ChatMessage,

    /// Whether a response part has replaced the placeholder yet.
    pub has_content: bool,
}

impl ReplyDraft {
    /// Starts a draft showing the processing placeholder.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            message: ChatMessage::assistant(id, PROCESSING_TEXT),
            has_content: false,
        }
    }
}

/// Applies one event to a draft.
///
/// # Examples
///
/// ```
/// use ragchat::stream::{ReplyDraft, StreamEvent, apply};
///
/// let draft = ReplyDraft::new(1);
/// let draft = apply(draft, &StreamEvent::step("retrieve"));
/// let draft = apply(draft, &StreamEvent::response("Hello"));
/// let draft = apply(draft, &StreamEvent::response(" world"));
/// assert_eq!(draft.message.content, "Hello world");
/// ```
#[must_use]
pub fn apply(mut draft: ReplyDraft, event: &StreamEvent) -> ReplyDraft {
    match event {
        StreamEvent::Step { node } => {
            draft.message.content = node.status_text().to_string();
        }
        StreamEvent::ResponsePart { content, sources } => {
            if draft.has_content {
                draft.message.content.push_str(content);
            } else {
                draft.message.content.clone_from(content);
                draft.has_content = true;
            }
            draft.message.sources.extend(sources.iter().cloned());
        }
        StreamEvent::Done => {}
    }
    draft
}

/// Overwrites the draft with the transport error text.
#[must_use]
pub fn fail(mut draft: ReplyDraft) -> ReplyDraft {
    draft.message.content = ERROR_TEXT.to_string();
    draft
}
