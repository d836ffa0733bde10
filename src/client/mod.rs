//! Backend client.
//!
//! [`ChatClient`] wraps every endpoint of the chat backend. Streamed turns
//! are read through [`ReplyReader`] and can be stopped with a
//! [`CancelHandle`].

pub mod api;
pub mod config;
pub mod http;
pub mod transport;

pub use api::{LoginResponse, LoginUser};
pub use config::{ApiUrls, ClientConfig, DEFAULT_API_URL};
pub use http::ChatClient;
pub use transport::{CancelHandle, ReplyReader, read_reply};
