//! Backend location and endpoint paths.

use crate::error::{Error, Result};
use reqwest::Url;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is not an absolute http(s) URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::client::ClientConfig;
    ///
    /// let config = ClientConfig::new("http://chat.local:5000/").unwrap();
    /// assert_eq!(config.base_url, "http://chat.local:5000");
    /// assert!(ClientConfig::new("not a url").is_err());
    /// ```
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|e| Error::Config {
            message: format!("invalid API URL '{base_url}': {e}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("API URL must use http or https, got '{}'", url.scheme()),
            });
        }
        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Endpoint URLs derived from the base URL.
    #[must_use]
    pub fn urls(&self) -> ApiUrls {
        ApiUrls {
            base: self.base_url.clone(),
        }
    }
}

/// Endpoint URLs of the backend.
///
/// # Examples
///
/// ```
/// use ragchat::client::ClientConfig;
///
/// let urls = ClientConfig::default().urls();
/// assert_eq!(urls.chat_stream(), "http://localhost:5000/api/chat-stream");
/// assert_eq!(urls.session(7), "http://localhost:5000/api/sessions/7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrls {
    base: String,
}

impl ApiUrls {
    fn join(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// `POST /register`
    #[must_use]
    pub fn register(&self) -> String {
        self.join("/register")
    }

    /// `POST /login`
    #[must_use]
    pub fn login(&self) -> String {
        self.join("/login")
    }

    /// `GET /api/profile`
    #[must_use]
    pub fn profile(&self) -> String {
        self.join("/api/profile")
    }

    /// `GET|POST /api/sessions`
    #[must_use]
    pub fn sessions(&self) -> String {
        self.join("/api/sessions")
    }

    /// `PUT|DELETE /api/sessions/{id}`
    #[must_use]
    pub fn session(&self, id: i64) -> String {
        self.join(&format!("/api/sessions/{id}"))
    }

    /// `GET /api/history/{id}`
    #[must_use]
    pub fn history(&self, id: i64) -> String {
        self.join(&format!("/api/history/{id}"))
    }

    /// `POST /api/chat`
    #[must_use]
    pub fn chat(&self) -> String {
        self.join("/api/chat")
    }

    /// `POST /api/chat-stream`
    #[must_use]
    pub fn chat_stream(&self) -> String {
        self.join("/api/chat-stream")
    }
}
