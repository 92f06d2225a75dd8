use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chat message row, exactly as the backend stores it.
///
/// `id` and `created_at` are assigned by the backend on insert; the
/// client never generates either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub username: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// The signed-in user, resolved from the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
    /// Display name shown on outgoing messages.
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_parses_backend_row() {
        let row = r#"{
            "id": "4f0c6f1e-58d4-4f1e-9a21-0b9f6a0c1d22",
            "content": "hello there",
            "username": "alice",
            "user_id": "user-1",
            "created_at": "2026-08-01T09:30:00+00:00"
        }"#;

        let message: ChatMessage = serde_json::from_str(row).unwrap();
        assert_eq!(message.content, "hello there");
        assert_eq!(message.username, "alice");
        assert_eq!(message.user_id, "user-1");
        assert_eq!(
            message.created_at,
            "2026-08-01T09:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn chat_message_rejects_row_without_timestamp() {
        let row = r#"{"id": "m1", "content": "hi", "username": "a", "user_id": "u1"}"#;
        assert!(serde_json::from_str::<ChatMessage>(row).is_err());
    }
}
