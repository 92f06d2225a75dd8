use serde::Deserialize;

use crate::common::UserIdentity;

use super::error::{BackendError, error_from_response};

/// Auth session held by the backend task for the lifetime of a
/// sign-in. There is no token refresh; an expired session surfaces as
/// request failures until the user signs in again.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub user: UserIdentity,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Sign-up answers with a session only when the project auto-confirms
/// accounts; otherwise the body carries just the pending user.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    username: Option<String>,
}

impl UserResponse {
    /// Display name fallback chain: chosen username, then the email
    /// local part, then a generic placeholder.
    fn into_identity(self) -> UserIdentity {
        let username = self
            .user_metadata
            .username
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "anonymous".to_string());

        UserIdentity {
            id: self.id,
            email: self.email,
            username,
        }
    }
}

/// Auth API client (`/auth/v1`).
pub struct AuthApi {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthApi {
    pub fn new(http: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// Password grant. Returns the access token; the identity is
    /// fetched separately so the chat view owns that step.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, BackendError> {
        let response = self
            .http
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Register a new account, storing the chosen display name in the
    /// profile metadata.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<String, BackendError> {
        let response = self
            .http
            .post(self.url("signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "username": username },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let body: SignUpResponse = response.json().await?;
        body.access_token.ok_or_else(|| BackendError::Api {
            status: status.as_u16(),
            message: "account created; confirm your email, then sign in".to_string(),
        })
    }

    /// Resolve the current identity from the access token.
    pub async fn fetch_user(&self, access_token: &str) -> Result<UserIdentity, BackendError> {
        let response = self
            .http
            .get(self.url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let user: UserResponse = response.json().await?;
        Ok(user.into_identity())
    }

    /// Invalidate the session server-side.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}
