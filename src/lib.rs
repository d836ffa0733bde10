//! # ragchat
//!
//! Streaming chat client for retrieval-augmented question answering
//! backends.
//!
//! The backend answers over a document corpus and streams its reply as
//! blank-line separated `data:` frames. ragchat reassembles those frames
//! into a single growing assistant message, whatever the chunk boundaries.
//!
//! ## Features
//!
//! - **Stream reassembly**: chunk-boundary independent framing, including
//!   splits inside multi-byte characters
//! - **Session context**: injected bearer credential with explicit
//!   init/clear lifecycle
//! - **Backend client**: every account, session and chat endpoint, with a
//!   cancellable reply reader
//! - **CLI**: text or JSON output, live rendering of streamed answers

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod client;
pub mod core;
pub mod error;
pub mod io;
pub mod stream;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{ChatLog, ChatMessage, Profile, Role, SessionSummary};

// Re-export streaming types
pub use stream::{
    FrameDecoder, StepNode, StreamEvent, StreamOutcome, StreamingReplyAssembler, TurnEnd,
    TurnState,
};

// Re-export auth and client types
pub use auth::{Credential, SessionContext};
pub use client::{CancelHandle, ChatClient, ClientConfig, ReplyReader};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
