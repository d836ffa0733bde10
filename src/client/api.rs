//! Request and response bodies exchanged with the backend.

use crate::core::ChatMessage;
use serde::{Deserialize, Serialize};

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    /// Lower-cased email address.
    pub email: String,
    /// Display name.
    pub username: &'a str,
    /// Plain-text password.
    pub password: &'a str,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Lower-cased email address.
    pub email: String,
    /// Plain-text password.
    pub password: &'a str,
}

/// Response of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent calls.
    pub access_token: String,
    /// The signed-in user, when the backend includes it.
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// User record embedded in [`LoginResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    /// Backend user id.
    #[serde(default)]
    pub id: Option<i64>,
    /// Email address.
    pub email: String,
    /// Display name.
    pub username: String,
}

/// Body of session create and rename calls.
#[derive(Debug, Clone, Serialize)]
pub struct NameRequest<'a> {
    /// Session name.
    pub name: &'a str,
}

/// Body of both chat endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// Target session.
    pub session_id: i64,
    /// Whole conversation, ending with the new user message.
    pub messages: &'a [ChatMessage],
}

/// Response of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Complete answer, possibly followed by an in-text sources section.
    pub response: String,
    /// Server-side processing time in seconds.
    #[serde(default)]
    pub processing_time: Option<f64>,
}

/// Plain acknowledgement such as `{"message": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Error description.
    #[serde(default)]
    pub error: Option<String>,
    /// Some endpoints use `message` instead.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message from a raw error body.
    ///
    /// Falls back to the raw text, then to `fallback`.
    #[must_use]
    pub fn describe(raw: &str, fallback: &str) -> String {
        if let Ok(body) = serde_json::from_str::<Self>(raw)
            && let Some(msg) = body.error.or(body.message)
        {
            return msg;
        }
        let raw = raw.trim();
        if raw.is_empty() {
            fallback.to_string()
        } else {
            raw.to_string()
        }
    }
}
