use serde::Serialize;

use crate::common::ChatMessage;

use super::error::{BackendError, error_from_response};

/// Table holding the single chat room's messages.
const MESSAGES_TABLE: &str = "messages";

/// Insert payload for one message. The backend fills in `id` and
/// `created_at` server-side.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage<'a> {
    pub content: &'a str,
    pub user_id: &'a str,
    pub username: &'a str,
}

/// REST data API client (`/rest/v1`).
pub struct DataApi {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl DataApi {
    pub fn new(http: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/rest/v1/{MESSAGES_TABLE}", self.base_url)
    }

    /// Fetch the full message history, ordered by creation time
    /// ascending. No filter, no pagination.
    pub async fn fetch_messages(&self, access_token: &str) -> Result<Vec<ChatMessage>, BackendError> {
        let response = self
            .http
            .get(self.messages_url())
            .query(&[("select", "*"), ("order", "created_at.asc")])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// Insert one message. `Prefer: return=minimal` skips the echo of
    /// the created row; it reaches the UI through the live
    /// subscription instead.
    pub async fn insert_message(
        &self,
        access_token: &str,
        message: NewMessage<'_>,
    ) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.messages_url())
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(access_token)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_strips_trailing_slash() {
        let api = DataApi::new(reqwest::Client::new(), "https://chat.example.co/", "key");
        assert_eq!(api.messages_url(), "https://chat.example.co/rest/v1/messages");
    }

    #[test]
    fn insert_payload_carries_exactly_the_writable_fields() {
        let payload = NewMessage {
            content: "hello",
            user_id: "user-1",
            username: "alice",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": "hello",
                "user_id": "user-1",
                "username": "alice",
            })
        );
    }
}
