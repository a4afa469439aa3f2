//! GoTrue auth API: sign up, password sign in, refresh, sign out.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use bottleshop_core::{Email, Password, UserId};

use super::{BackendClient, BackendError};

/// The user object returned by the auth API.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens returned by a successful sign in, refresh, or auto-confirmed sign up.
#[derive(Clone, Deserialize)]
pub struct AuthSessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
    /// Unix timestamp at which `access_token` expires, when the server sends it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSessionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Sign-up result: a live session when the project auto-confirms emails,
/// otherwise the new (unconfirmed) user.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(AuthSessionResponse),
    User(AuthUser),
}

impl BackendClient {
    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` with the backend's message (e.g. "User
    /// already registered"), or any transport error.
    #[instrument(skip(self, email, password))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &Password,
    ) -> Result<SignUpResponse, BackendError> {
        let url = self.endpoint("auth/v1/signup")?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "email": email.as_str(), "password": password.expose() }));
        self.send_json(request).await
    }

    /// Exchange an email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` ("Invalid login credentials") for a wrong
    /// password or unknown email, or any transport error.
    #[instrument(skip(self, email, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &Password,
    ) -> Result<AuthSessionResponse, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "email": email.as_str(), "password": password.expose() }));
        self.send_json(request).await
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token was revoked or already used.
    #[instrument(skip_all)]
    pub async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<AuthSessionResponse, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "refresh_token": refresh_token }));
        self.send_json(request).await
    }

    /// Revoke every refresh token of the user owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the token or is unreachable.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let mut url = self.endpoint("auth/v1/logout")?;
        url.query_pairs_mut().append_pair("scope", "global");
        let request = self.request(Method::POST, url, Some(access_token));
        self.send(request).await.map(|_| ())
    }

    /// The user owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` for an expired or invalid token.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        self.send_json(self.request(Method::GET, url, Some(access_token)))
            .await
    }

    /// Ping the auth service. Used by the readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/health")?;
        self.send(self.request(Method::GET, url, None))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const USER_ID: &str = "7b0c7f9e-4c1e-4f57-9a55-0f6f1f8c2d11";

    #[test]
    fn test_sign_up_with_session() {
        let json = format!(
            r#"{{"access_token":"a","refresh_token":"r","expires_in":3600,"expires_at":1700003600,"token_type":"bearer","user":{{"id":"{USER_ID}","email":"x@shop.test"}}}}"#
        );
        let parsed: SignUpResponse = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, SignUpResponse::Session(_)));
    }

    #[test]
    fn test_sign_up_awaiting_confirmation() {
        let json = format!(
            r#"{{"id":"{USER_ID}","email":"x@shop.test","confirmation_sent_at":"2024-01-01T00:00:00Z"}}"#
        );
        let parsed: SignUpResponse = serde_json::from_str(&json).unwrap();
        match parsed {
            SignUpResponse::User(user) => assert_eq!(user.id.to_string(), USER_ID),
            SignUpResponse::Session(_) => panic!("expected a bare user"),
        }
    }

    #[test]
    fn test_session_debug_redacts_tokens() {
        let json = format!(
            r#"{{"access_token":"very-secret-access","refresh_token":"very-secret-refresh","expires_in":60,"user":{{"id":"{USER_ID}"}}}}"#
        );
        let session: AuthSessionResponse = serde_json::from_str(&json).unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("very-secret"));
    }
}
