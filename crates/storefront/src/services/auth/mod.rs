//! Authentication service.
//!
//! Password sign in and sign up against the hosted auth API, token refresh,
//! sign out, and profile updates. Input is validated before any request.

mod error;

pub use error::AuthError;

use tracing::instrument;

use bottleshop_core::{Email, Password, PasswordError, ProfileUpdate, UserProfile, ValidationErrors};

use crate::backend::{BackendClient, BackendError, SignUpResponse};
use crate::models::AuthState;
use crate::services::ProfileService;

/// What a successful sign up led to.
#[derive(Debug)]
pub enum SignUpOutcome {
    /// The backend auto-confirmed the account and returned a session.
    SignedIn(Box<AuthState>),
    /// The account exists but the email must be confirmed first.
    ConfirmationRequired,
}

/// Authentication service.
pub struct AuthService<'a> {
    backend: &'a BackendClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Sign in with email and password.
    ///
    /// Any `previous` session is revoked first, best effort. On success the
    /// profile is fetched; a failed fetch leaves the profile empty.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for malformed input and
    /// `AuthError::InvalidCredentials` when the backend refuses the sign in.
    #[instrument(skip(self, email, password, previous))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        previous: Option<&AuthState>,
    ) -> Result<AuthState, AuthError> {
        let (email, password) = validate_credentials(email, password, None)?;

        if let Some(previous) = previous
            && let Err(e) = self.backend.sign_out(previous.access_token()).await
        {
            tracing::debug!("Ignoring failure to revoke previous session: {e}");
        }

        let response = self
            .backend
            .sign_in_with_password(&email, &password)
            .await
            .map_err(rejected_credentials)?;

        let mut state = AuthState::from_response(&response);
        state.profile = self.fetch_profile(&state).await;
        Ok(state)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for malformed input or mismatched
    /// passwords, or the backend's rejection (e.g. already registered).
    #[instrument(skip(self, email, password, confirm))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let (email, password) = validate_credentials(email, password, Some(confirm))?;

        match self.backend.sign_up(&email, &password).await? {
            SignUpResponse::Session(response) => {
                let mut state = AuthState::from_response(&response);
                state.profile = self.fetch_profile(&state).await;
                Ok(SignUpOutcome::SignedIn(Box::new(state)))
            }
            SignUpResponse::User(_) => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    /// Revoke the backend session (global scope).
    ///
    /// Callers clear local state whatever the result.
    ///
    /// # Errors
    ///
    /// Returns the backend error if revocation failed.
    #[instrument(skip_all, fields(user_id = %state.user.id))]
    pub async fn sign_out(&self, state: &AuthState) -> Result<(), AuthError> {
        self.backend.sign_out(state.access_token()).await?;
        Ok(())
    }

    /// Exchange the refresh token for fresh tokens, keeping the cached profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is no longer valid.
    #[instrument(skip_all, fields(user_id = %state.user.id))]
    pub async fn refresh(&self, state: &AuthState) -> Result<AuthState, AuthError> {
        let response = self
            .backend
            .refresh_session(&state.session.refresh_token)
            .await?;
        let mut refreshed = AuthState::from_response(&response);
        refreshed.profile.clone_from(&state.profile);
        Ok(refreshed)
    }

    /// Fetch the profile of the signed-in user. Failures are logged and
    /// yield `None`.
    pub async fn fetch_profile(&self, state: &AuthState) -> Option<UserProfile> {
        match ProfileService::new(self.backend, Some(state.access_token()))
            .by_id(state.user.id)
            .await
        {
            Ok(profile) => {
                if profile.is_none() {
                    tracing::warn!(user_id = %state.user.id, "No profile row for user");
                }
                profile
            }
            Err(e) => {
                tracing::error!(user_id = %state.user.id, "Failed to fetch profile: {e}");
                None
            }
        }
    }

    /// Validate and apply a profile update, returning the state with the
    /// stored profile (and so the recomputed admin flag).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for bad input or the backend error.
    #[instrument(skip_all, fields(user_id = %state.user.id))]
    pub async fn update_profile(
        &self,
        state: &AuthState,
        update: ProfileUpdate,
    ) -> Result<AuthState, AuthError> {
        let update = update.validate()?;
        let profile = ProfileService::new(self.backend, Some(state.access_token()))
            .update(state.user.id, &update)
            .await?;
        let mut updated = state.clone();
        updated.profile = Some(profile);
        Ok(updated)
    }
}

/// Check an email/password pair (and confirmation, for sign up).
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_credentials(
    email: &str,
    password: &str,
    confirm: Option<&str>,
) -> Result<(Email, Password), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = Email::parse(email)
        .map_err(|e| errors.add("email", e.to_string()))
        .ok();

    let password = match confirm {
        Some(confirm) => Password::parse_confirmed(password, confirm),
        None => Password::parse(password),
    }
    .map_err(|e| match e {
        PasswordError::Mismatch => errors.add("confirm_password", e.to_string()),
        PasswordError::TooShort { .. } => errors.add("password", e.to_string()),
    })
    .ok();

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok((email, password)),
        _ => Err(errors),
    }
}

/// Map a failed password grant to the message the backend gave.
fn rejected_credentials(error: BackendError) -> AuthError {
    match error {
        BackendError::Api { message, .. } | BackendError::Unauthorized(message) => {
            AuthError::InvalidCredentials(message)
        }
        other => AuthError::Backend(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_credentials_ok() {
        let (email, _) = validate_credentials(" pat@shop.test ", "hunter22", None).unwrap();
        assert_eq!(email.as_str(), "pat@shop.test");
    }

    #[test]
    fn test_validate_credentials_collects_fields() {
        let errors = validate_credentials("nope", "123", None).unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn test_validate_confirmation() {
        let errors = validate_credentials("pat@shop.test", "hunter22", Some("hunter23")).unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("passwords don't match"));
        assert!(errors.get("password").is_none());
    }

    #[test]
    fn test_rejected_credentials_keeps_backend_message() {
        let err = rejected_credentials(BackendError::Api {
            status: 400,
            code: None,
            message: "Invalid login credentials".to_string(),
        });
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
    }
}
