//! HTTP client for the chat backend.

use super::api::{
    ChatRequest, ChatResponse, ErrorBody, LoginRequest, LoginResponse, MessageResponse,
    NameRequest, RegisterRequest,
};
use super::config::{ApiUrls, ClientConfig};
use super::transport::{CancelHandle, ReplyReader, read_reply};
use crate::auth::SessionContext;
use crate::core::{ChatLog, ChatMessage, Profile, SessionSummary};
use crate::error::{ApiError, Error, Result};
use crate::stream::{StreamOutcome, StreamingReplyAssembler};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Client for every backend endpoint.
///
/// Authenticated calls take their bearer token from the injected
/// [`SessionContext`]. A 401 or 422 from an authenticated call clears it.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    urls: ApiUrls,
    session: SessionContext,
}

impl ChatClient {
    /// Creates a client for `config`, sharing `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("ragchat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            urls: config.urls(),
            session,
        })
    }

    /// The session context this client reads credentials from.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Endpoint URLs in use.
    #[must_use]
    pub const fn urls(&self) -> &ApiUrls {
        &self.urls
    }

    /// Creates an account.
    ///
    /// Returns the backend's confirmation message.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<String> {
        let body = RegisterRequest {
            email: normalize_email(email),
            username,
            password,
        };
        let request = self.http.post(self.urls.register()).json(&body);
        let response = self.send(request, false).await?;
        let ack: MessageResponse = decode(response).await?;
        info!(email = %body.email, "account registered");
        Ok(ack
            .message
            .unwrap_or_else(|| "User registered successfully".to_string()))
    }

    /// Signs in and stores the returned token in the session context.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email: normalize_email(email),
            password,
        };
        let request = self.http.post(self.urls.login()).json(&body);
        let response = self.send(request, false).await?;
        let login: LoginResponse = decode(response).await?;
        self.session.init(login.access_token.clone());
        info!(email = %body.email, "signed in");
        Ok(login)
    }

    /// Signs out locally. Returns true if a credential was held.
    pub fn logout(&self) -> bool {
        self.session.clear()
    }

    /// Fetches the signed-in user's profile.
    pub async fn profile(&self) -> Result<Profile> {
        let request = self.authed(Method::GET, self.urls.profile())?;
        decode(self.send(request, true).await?).await
    }

    /// Lists the user's sessions, most recently updated first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let request = self.authed(Method::GET, self.urls.sessions())?;
        decode(self.send(request, true).await?).await
    }

    /// Creates a session.
    pub async fn create_session(&self, name: &str) -> Result<SessionSummary> {
        let request = self
            .authed(Method::POST, self.urls.sessions())?
            .json(&NameRequest { name });
        decode(self.send(request, true).await?).await
    }

    /// Renames a session.
    pub async fn rename_session(&self, id: i64, name: &str) -> Result<SessionSummary> {
        let request = self
            .authed(Method::PUT, self.urls.session(id))?
            .json(&NameRequest { name });
        decode(self.send(request, true).await?).await
    }

    /// Deletes a session and its history.
    pub async fn delete_session(&self, id: i64) -> Result<()> {
        let request = self.authed(Method::DELETE, self.urls.session(id))?;
        self.send(request, true).await?;
        info!(session_id = id, "session deleted");
        Ok(())
    }

    /// Loads a session's stored messages into a fresh log.
    pub async fn history(&self, id: i64) -> Result<ChatLog> {
        let request = self.authed(Method::GET, self.urls.history(id))?;
        let messages: Vec<ChatMessage> = decode(self.send(request, true).await?).await?;
        debug!(session_id = id, count = messages.len(), "history loaded");
        Ok(ChatLog::from_history(messages))
    }

    /// Sends a conversation to the non-streaming endpoint and returns the
    /// complete answer text.
    pub async fn chat(&self, session_id: i64, messages: &[ChatMessage]) -> Result<String> {
        let request = self
            .authed(Method::POST, self.urls.chat())?
            .json(&ChatRequest {
                session_id,
                messages,
            });
        let reply: ChatResponse = decode(self.send(request, true).await?).await?;
        debug!(
            session_id,
            processing_time = ?reply.processing_time,
            "chat reply received"
        );
        Ok(reply.response)
    }

    /// Runs one streamed turn.
    ///
    /// Appends `prompt` as a user message, appends the live assistant reply,
    /// and grows it as events arrive, calling `on_update` after each change.
    /// Transport failures end the turn with the error text in the reply;
    /// they are not returned as errors.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignInRequired`](crate::error::AuthError::SignInRequired)
    /// before touching `log` if no usable credential is held.
    pub async fn chat_stream<F>(
        &self,
        session_id: i64,
        log: &mut ChatLog,
        prompt: &str,
        cancel: &CancelHandle,
        mut on_update: F,
    ) -> Result<ChatMessage>
    where
        F: FnMut(&ChatLog),
    {
        let request = self.authed(Method::POST, self.urls.chat_stream())?;

        log.push_user(prompt);
        let outgoing = log.messages().to_vec();
        let mut assembler = StreamingReplyAssembler::new();
        assembler.start(log)?;
        on_update(log);

        let request = request.json(&ChatRequest {
            session_id,
            messages: &outgoing,
        });
        debug!(session_id, messages = outgoing.len(), "starting reply stream");

        let outcome = match self.send(request, true).await {
            Ok(response) => {
                let mut reader = ReplyReader::new(Box::pin(response.bytes_stream()));
                read_reply(&mut reader, &mut assembler, log, cancel, &mut on_update).await
            }
            Err(err) => StreamOutcome::Failed(err),
        };

        assembler.finish(outcome);
        assembler.publish(log);
        on_update(log);

        assembler.message().cloned().ok_or_else(|| Error::InvalidState {
            message: "reply missing after stream end".to_string(),
        })
    }

    fn authed(&self, method: Method, url: String) -> Result<RequestBuilder> {
        let token = self.session.bearer()?;
        Ok(self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {token}")))
    }

    async fn send(&self, request: RequestBuilder, authed: bool) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "response received");
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = ErrorBody::describe(&raw, status.canonical_reason().unwrap_or("request failed"));
        if authed && rejects_credential(status) && self.session.clear() {
            warn!(status = status.as_u16(), %message, "credential rejected; signed out");
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        }
        .into())
    }
}

fn rejects_credential(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::UNPROCESSABLE_ENTITY
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}
