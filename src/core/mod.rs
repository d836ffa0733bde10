//! Core domain models for ragchat.
//!
//! This module contains the data structures shared by the stream, client
//! and CLI layers: messages, the chat log, sessions and reply bodies.
//! These are pure domain models with no I/O dependencies.

pub mod chat_log;
pub mod message;
pub mod reply;
pub mod session;

pub use chat_log::ChatLog;
pub use message::{ChatMessage, Role};
pub use reply::{ReplyBody, SOURCES_MARKER, format_sources, split_reply};
pub use session::{Profile, SessionSummary};
