//! Chat sessions and user profile.

use serde::{Deserialize, Serialize};

/// A chat session as listed in the sidebar.
///
/// The create endpoint reports the id as `session_id`; every other
/// endpoint uses `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Backend session id.
    #[serde(alias = "session_id")]
    pub id: i64,

    /// User-visible session name.
    pub name: String,

    /// ISO-8601 creation time.
    #[serde(default)]
    pub created_at: Option<String>,

    /// ISO-8601 last update time.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Account e-mail.
    pub email: String,

    /// Display name.
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_list_endpoint() {
        let json = r#"{
            "id": 3,
            "name": "Thesis",
            "created_at": "2024-10-01T08:00:00",
            "updated_at": "2024-10-02T08:00:00",
            "chat_history": [],
            "summary": [],
            "last_document": []
        }"#;
        let session: SessionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, 3);
        assert_eq!(session.name, "Thesis");
    }

    #[test]
    fn test_session_from_create_endpoint() {
        let json = r#"{"session_id": 9, "name": "New chat"}"#;
        let session: SessionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, 9);
        assert!(session.created_at.is_none());
    }
}
