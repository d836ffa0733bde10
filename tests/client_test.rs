//! Tests for the backend client against a mock server.

#![allow(clippy::expect_used)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ragchat::client::{CancelHandle, ChatClient, ClientConfig};
use ragchat::core::{ChatLog, Role};
use ragchat::error::{ApiError, AuthError, Error};
use ragchat::stream::{ERROR_TEXT, PROCESSING_TEXT};
use ragchat::SessionContext;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Unsigned JWT-shaped token that never expires.
fn token() -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
    let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"1"}"#);
    format!("{header}.{payload}.sig")
}

/// Helper to create a client pointed at the mock server.
fn client_for(server: &MockServer, session: &SessionContext) -> ChatClient {
    let config = ClientConfig::new(&server.uri()).expect("config");
    ChatClient::new(&config, session.clone()).expect("client")
}

fn signed_in() -> SessionContext {
    SessionContext::with_token(token())
}

#[tokio::test]
async fn test_login_lowercases_email_and_inits_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(serde_json::json!({
            "email": "alice@example.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token(),
            "user": { "id": 1, "email": "alice@example.com", "username": "alice" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionContext::new();
    let client = client_for(&server, &session);
    let login = client
        .login("Alice@Example.com", "secret")
        .await
        .expect("login failed");

    assert_eq!(login.user.expect("user").username, "alice");
    assert_eq!(session.bearer().expect("bearer"), token());
}

#[tokio::test]
async fn test_login_failure_reports_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let session = SessionContext::new();
    let client = client_for(&server, &session);
    let err = client.login("a@b.c", "wrong").await.expect_err("should fail");

    assert!(matches!(
        err,
        Error::Api(ApiError::Status { status: 401, ref message }) if message == "Invalid credentials"
    ));
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_register() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(serde_json::json!({
            "email": "bob@example.com",
            "username": "bob",
            "password": "hunter22"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "message": "User registered successfully" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &SessionContext::new());
    let message = client
        .register(" BOB@example.com", "bob", "hunter22")
        .await
        .expect("register failed");
    assert_eq!(message, "User registered successfully");
}

#[tokio::test]
async fn test_authed_calls_send_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .and(header("Authorization", format!("Bearer {}", token()).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 2, "name": "Thesis", "created_at": "2024-10-01T08:00:00",
              "updated_at": "2024-10-02T08:00:00", "chat_history": [] },
            { "id": 1, "name": "Notes", "created_at": null, "updated_at": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &signed_in());
    let sessions = client.list_sessions().await.expect("list failed");

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, 2);
    assert_eq!(sessions[1].name, "Notes");
}

#[tokio::test]
async fn test_signed_out_call_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, &SessionContext::new());
    let err = client.profile().await.expect_err("should fail");
    assert!(matches!(err, Error::Auth(AuthError::SignInRequired)));
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": "Unauthorized access" })),
        )
        .mount(&server)
        .await;

    let session = signed_in();
    let client = client_for(&server, &session);
    let err = client.profile().await.expect_err("should fail");

    assert!(matches!(err, Error::Api(ApiError::Status { status: 401, .. })));
    assert!(session.credential().is_none());
}

#[tokio::test]
async fn test_invalid_token_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/4"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(serde_json::json!({ "error": "Invalid token" })),
        )
        .mount(&server)
        .await;

    let session = signed_in();
    let client = client_for(&server, &session);
    assert!(client.history(4).await.is_err());
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_not_found_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/sessions/9"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "error": "Session not found" })),
        )
        .mount(&server)
        .await;

    let session = signed_in();
    let client = client_for(&server, &session);
    let err = client.delete_session(9).await.expect_err("should fail");

    assert!(err.to_string().contains("Session not found"));
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn test_session_crud() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sessions"))
        .and(body_json(serde_json::json!({ "name": "Physics" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "session_id": 7, "name": "Physics",
            "created_at": "2024-10-01T08:00:00", "updated_at": "2024-10-01T08:00:00",
            "chat_history": [], "summary": [], "last_document": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/sessions/7"))
        .and(body_json(serde_json::json!({ "name": "Optics" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 7, "name": "Optics" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sessions/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "Session deleted successfully" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &signed_in());
    let created = client.create_session("Physics").await.expect("create");
    assert_eq!(created.id, 7);
    let renamed = client.rename_session(7, "Optics").await.expect("rename");
    assert_eq!(renamed.name, "Optics");
    client.delete_session(7).await.expect("delete");
}

#[tokio::test]
async fn test_history_builds_log() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "role": "user", "content": "Hi", "timestamp": "Wed, 16 Oct 2024 10:00:00 GMT" },
            { "role": "AI", "content": "Hello", "timestamp": "Wed, 16 Oct 2024 10:00:02 GMT" }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, &signed_in());
    let log = client.history(3).await.expect("history");

    assert_eq!(log.len(), 2);
    assert_eq!(log.messages()[1].role, Role::Assistant);
    assert_eq!(log.messages()[1].id, 2);
}

#[tokio::test]
async fn test_non_streaming_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(serde_json::json!({
            "session_id": 5,
            "messages": [{ "id": 1, "role": "user", "content": "Why?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "Because.",
            "processing_time": 0.4,
            "session_state": {}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, &signed_in());
    let mut log = ChatLog::new();
    log.push_user("Why?");
    let answer = client.chat(5, log.messages()).await.expect("chat");
    assert_eq!(answer, "Because.");
}

#[tokio::test]
async fn test_chat_stream_assembles_reply() {
    let body = concat!(
        "data: {\"type\":\"step\",\"node\":\"retrieve\"}\n\n",
        "data: {\"type\":\"response\",\"content\":\"Hello\"}\n\n",
        "data: {\"type\":\"response\",\"content\":\" world\"}\n\n",
        "data: {\"type\":\"done\"}\n\n",
    );
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat-stream"))
        .and(header("Authorization", format!("Bearer {}", token()).as_str()))
        .and(body_json(serde_json::json!({
            "session_id": 1,
            "messages": [{ "id": 1, "role": "user", "content": "Greet me" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &signed_in());
    let mut log = ChatLog::new();
    let mut seen = Vec::new();
    let reply = client
        .chat_stream(1, &mut log, "Greet me", &CancelHandle::new(), |log| {
            seen.push(log.last().expect("reply").content.clone());
        })
        .await
        .expect("chat_stream");

    assert_eq!(reply.content, "Hello world");
    assert_eq!(log.len(), 2);
    assert_eq!(log.last().expect("reply").content, "Hello world");
    assert!(log.live().is_none());
    assert_eq!(seen.first().map(String::as_str), Some(PROCESSING_TEXT));
    assert_eq!(seen.last().map(String::as_str), Some("Hello world"));
}

#[tokio::test]
async fn test_chat_stream_server_error_finalizes_with_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat-stream"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "error": "Session not found" })),
        )
        .mount(&server)
        .await;

    let session = signed_in();
    let client = client_for(&server, &session);
    let mut log = ChatLog::new();
    let reply = client
        .chat_stream(99, &mut log, "Hi", &CancelHandle::new(), |_| {})
        .await
        .expect("transport failures are not errors");

    assert_eq!(reply.content, ERROR_TEXT);
    assert_eq!(log.len(), 2);
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn test_chat_stream_rejected_token_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat-stream"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": "Unauthorized access" })),
        )
        .mount(&server)
        .await;

    let session = signed_in();
    let client = client_for(&server, &session);
    let mut log = ChatLog::new();
    let reply = client
        .chat_stream(1, &mut log, "Hi", &CancelHandle::new(), |_| {})
        .await
        .expect("chat_stream");

    assert_eq!(reply.content, ERROR_TEXT);
    assert!(session.credential().is_none());
}

#[tokio::test]
async fn test_chat_stream_signed_out_leaves_log_untouched() {
    let server = MockServer::start().await;
    let client = client_for(&server, &SessionContext::new());
    let mut log = ChatLog::new();

    let err = client
        .chat_stream(1, &mut log, "Hi", &CancelHandle::new(), |_| {})
        .await
        .expect_err("should require sign-in");

    assert!(matches!(err, Error::Auth(AuthError::SignInRequired)));
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_chat_stream_trailing_frame_without_delimiter() {
    let body = concat!(
        "data: {\"type\":\"response\",\"content\":\"Par\"}\n\n",
        "data: {\"type\":\"response\",\"content\":\"is\"}",
    );
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server, &signed_in());
    let mut log = ChatLog::new();
    let reply = client
        .chat_stream(1, &mut log, "Capital?", &CancelHandle::new(), |_| {})
        .await
        .expect("chat_stream");
    assert_eq!(reply.content, "Paris");
}

#[tokio::test]
async fn test_chat_stream_trailing_done_without_delimiter() {
    let body = concat!(
        "data: {\"type\":\"response\",\"content\":\"ab\"}\n\n",
        "data: {\"type\":\"done\"}",
    );
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server, &signed_in());
    let mut log = ChatLog::new();
    let reply = client
        .chat_stream(1, &mut log, "Letters?", &CancelHandle::new(), |_| {})
        .await
        .expect("chat_stream");

    assert_eq!(reply.content, "ab");
    assert_eq!(log.len(), 2);
    assert_eq!(log.last().expect("reply").content, "ab");
    assert!(log.live().is_none());
}

#[tokio::test]
async fn test_chat_stream_sends_previous_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"type\":\"response\",\"content\":\"ok\"}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server, &signed_in());
    let mut log = ChatLog::new();
    client
        .chat_stream(1, &mut log, "first", &CancelHandle::new(), |_| {})
        .await
        .expect("first turn");
    client
        .chat_stream(1, &mut log, "second", &CancelHandle::new(), |_| {})
        .await
        .expect("second turn");

    let requests = server.received_requests().await.expect("recording enabled");
    let last: serde_json::Value = requests
        .last()
        .expect("request")
        .body_json()
        .expect("json body");
    let contents: Vec<&str> = last["messages"]
        .as_array()
        .expect("messages")
        .iter()
        .filter_map(|m| m["content"].as_str())
        .collect();
    assert_eq!(contents, vec!["first", "ok", "second"]);
    assert_eq!(log.len(), 4);
}
