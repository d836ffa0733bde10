//! I/O utilities for ragchat.
//!
//! Provides incremental UTF-8 decoding for network chunks, grapheme-aware
//! text helpers for output, and credential file persistence.

pub mod decoder;
pub mod token_store;
pub mod unicode;

pub use decoder::Utf8Decoder;
pub use token_store::TokenStore;
pub use unicode::{ellipsize, truncate_graphemes};
