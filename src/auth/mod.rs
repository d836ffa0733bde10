//! Credential handling.
//!
//! The library never reads or writes ambient storage for credentials; the
//! caller decides where a token comes from and hands it to a
//! [`SessionContext`].

pub mod context;
pub mod credential;

pub use context::SessionContext;
pub use credential::{Credential, unix_now};
