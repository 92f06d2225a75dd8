use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("websocket transport failed: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
    #[error("timed out waiting for realtime acknowledgement")]
    Timeout,
    #[error("not signed in")]
    MissingSession,
}

impl From<tokio_tungstenite::tungstenite::Error> for BackendError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(err))
    }
}

/// Turn a non-success response into `BackendError::Api`, pulling the
/// human-readable message out of whichever field this platform's
/// surface uses (`message` for the data API, `msg`/`error_description`
/// for the auth API).
pub async fn error_from_response(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BackendError::Api {
        status,
        message: extract_api_message(&body),
    }
}

fn extract_api_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(|m| m.as_str()) {
                return message.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error detail provided".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_data_api_message() {
        let body = r#"{"code": "42501", "message": "permission denied for table messages"}"#;
        assert_eq!(
            extract_api_message(body),
            "permission denied for table messages"
        );
    }

    #[test]
    fn extracts_auth_api_message() {
        let body = r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#;
        assert_eq!(extract_api_message(body), "Invalid login credentials");
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(extract_api_message("gateway exploded"), "gateway exploded");
        assert_eq!(extract_api_message("  "), "no error detail provided");
    }
}
