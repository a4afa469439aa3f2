//! Authentication state kept in the session.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use bottleshop_core::types::profile::initials;
use bottleshop_core::{UserId, UserProfile};

use crate::backend::AuthSessionResponse;

/// Seconds before expiry at which an access token is treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The signed-in user as reported by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Option<String>,
}

/// Backend tokens for the signed-in user.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp at which `access_token` expires.
    pub expires_at: i64,
}

impl BackendSession {
    /// Check if the access token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at - EXPIRY_MARGIN_SECS
    }
}

impl std::fmt::Debug for BackendSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl From<&AuthSessionResponse> for BackendSession {
    fn from(response: &AuthSessionResponse) -> Self {
        let expires_at = response
            .expires_at
            .unwrap_or_else(|| Utc::now().timestamp() + response.expires_in);
        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_at,
        }
    }
}

/// Who is signed in, their cached profile, and their backend tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: SessionUser,
    pub profile: Option<UserProfile>,
    pub session: BackendSession,
}

impl AuthState {
    /// Build the state for a fresh backend session, without a profile yet.
    #[must_use]
    pub fn from_response(response: &AuthSessionResponse) -> Self {
        Self {
            user: SessionUser {
                id: response.user.id,
                email: response.user.email.clone(),
            },
            profile: None,
            session: BackendSession::from(response),
        }
    }

    /// The single admin predicate used by both the admin gate and the nav link.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(UserProfile::is_admin)
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.session.access_token
    }

    #[must_use]
    pub fn email(&self) -> &str {
        self.user.email.as_deref().unwrap_or_default()
    }

    /// Username when set, otherwise the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.profile
            .as_ref()
            .and_then(|p| p.username.clone())
            .unwrap_or_else(|| self.email().to_string())
    }

    #[must_use]
    pub fn initials(&self) -> String {
        let email = self.email();
        self.profile.as_ref().map_or_else(
            || initials(email.split('@').next().unwrap_or_default()),
            |p| p.initials(email),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(is_admin: Option<bool>, with_profile: bool) -> AuthState {
        let id = UserId::random();
        AuthState {
            user: SessionUser {
                id,
                email: Some("pat@shop.test".to_string()),
            },
            profile: with_profile.then(|| UserProfile {
                id,
                username: None,
                avatar_url: None,
                is_admin,
                preferred_theme: None,
                created_at: None,
                updated_at: None,
            }),
            session: BackendSession {
                access_token: "tok-access-1".to_string(),
                refresh_token: "tok-refresh-1".to_string(),
                expires_at: Utc::now().timestamp() + 3600,
            },
        }
    }

    #[test]
    fn test_admin_requires_profile_flag() {
        assert!(!state(None, false).is_admin());
        assert!(!state(None, true).is_admin());
        assert!(!state(Some(false), true).is_admin());
        assert!(state(Some(true), true).is_admin());
    }

    #[test]
    fn test_expiry_margin() {
        let mut auth = state(None, false);
        assert!(!auth.session.is_expired());
        auth.session.expires_at = Utc::now().timestamp() + 30;
        assert!(auth.session.is_expired());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let auth = state(None, true);
        assert_eq!(auth.display_name(), "pat@shop.test");
        assert_eq!(auth.initials(), "PA");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", state(None, false));
        assert!(!debug.contains("tok-access-1"));
        assert!(!debug.contains("tok-refresh-1"));
        assert!(debug.contains("[REDACTED]"));
    }
}
