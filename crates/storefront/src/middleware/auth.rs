//! Authentication middleware and extractors.
//!
//! The signed-in user lives in the session as an [`AuthState`].
//! [`restore_auth_session`] keeps it fresh once per request; the extractors
//! below hand it to handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{AuthState, session_keys};
use crate::services::AuthService;
use crate::state::AppState;

/// Where anonymous visitors are sent.
pub const SIGN_IN_PATH: &str = "/auth";

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, redirects to the sign-in page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(auth): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", auth.display_name())
/// }
/// ```
pub struct RequireAuth(pub AuthState);

/// Extractor that requires a signed-in admin.
///
/// This is the only admin check: anonymous visitors are redirected to the
/// sign-in page, signed-in non-admins get 403.
pub struct RequireAdmin(pub AuthState);

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// signed in.
pub struct OptionalAuth(pub Option<AuthState>);

/// Error returned when a route needs a user the request does not carry.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the sign-in page.
    RedirectToLogin,
    /// Signed in, but not an admin.
    Forbidden,
    /// The session layer is missing from the stack.
    SessionUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(SIGN_IN_PATH).into_response(),
            Self::Forbidden => {
                AppError::Forbidden("Admin access required".to_string()).into_response()
            }
            Self::SessionUnavailable => {
                AppError::Internal("session layer not installed".to_string()).into_response()
            }
        }
    }
}

async fn load_auth_state(parts: &Parts) -> Result<Option<AuthState>, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::SessionUnavailable)?;

    Ok(session
        .get::<AuthState>(session_keys::AUTH)
        .await
        .ok()
        .flatten())
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        load_auth_state(parts)
            .await?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = load_auth_state(parts)
            .await?
            .ok_or(AuthRejection::RedirectToLogin)?;

        if !auth.is_admin() {
            tracing::warn!(user_id = %auth.user.id, path = %parts.uri.path(), "Non-admin denied");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(auth))
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(load_auth_state(parts).await.ok().flatten()))
    }
}

/// Helper to store the signed-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_state(
    session: &Session,
    auth: &AuthState,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::AUTH, auth).await
}

/// Helper to clear the signed-in user from the session (sign out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_state(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<AuthState>(session_keys::AUTH).await?;
    Ok(())
}

/// Refresh an expired access token and fetch a missing profile.
///
/// Runs inside the session layer, once per request. A refresh failure
/// signs the visitor out locally; a failed profile fetch is retried on the
/// next request.
pub async fn restore_auth_session(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    if let Ok(Some(auth)) = session.get::<AuthState>(session_keys::AUTH).await {
        restore(&state, &session, auth).await;
    }

    next.run(request).await
}

async fn restore(state: &AppState, session: &Session, mut auth: AuthState) {
    let service = AuthService::new(state.backend());
    let mut changed = false;

    if auth.session.is_expired() {
        match service.refresh(&auth).await {
            Ok(refreshed) => {
                tracing::debug!(user_id = %auth.user.id, "Refreshed access token");
                auth = refreshed;
                changed = true;
            }
            Err(e) => {
                tracing::warn!(user_id = %auth.user.id, "Token refresh failed, signing out: {e}");
                if let Err(e) = clear_auth_state(session).await {
                    tracing::error!("Failed to clear auth state: {e}");
                }
                return;
            }
        }
    }

    if auth.profile.is_none()
        && let Some(profile) = service.fetch_profile(&auth).await
    {
        auth.profile = Some(profile);
        changed = true;
    }

    if changed && let Err(e) = set_auth_state(session, &auth).await {
        tracing::error!("Failed to store refreshed auth state: {e}");
    }
}
