//! Authentication route handlers.
//!
//! Email and password sign in and registration against the hosted auth
//! API. Outcomes are reported as notifications on the next page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bottleshop_core::ValidationErrors;

use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, PageContext, clear_auth_state, set_auth_state};
use crate::models::{AuthState, Flash, push_flash};
use crate::services::{AuthError, AuthService, SignUpOutcome};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign in form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Which of the two forms is shown first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    SignIn,
    Register,
}

/// Sign in and register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/index.html")]
pub struct AuthTemplate {
    pub page: PageContext,
    pub tab: AuthTab,
    pub email: String,
    pub errors: ValidationErrors,
}

impl AuthTemplate {
    fn new(page: PageContext) -> Self {
        Self {
            page,
            tab: AuthTab::SignIn,
            email: String::new(),
            errors: ValidationErrors::new(),
        }
    }

    fn show_register(&self) -> bool {
        self.tab == AuthTab::Register
    }
}

/// Re-render the forms with field errors.
fn invalid_form(
    mut page: PageContext,
    tab: AuthTab,
    email: &str,
    title: &str,
    errors: ValidationErrors,
) -> Response {
    let summary = errors
        .iter()
        .next()
        .map_or_else(|| "Please check the form".to_string(), |e| e.message.clone());
    page.flashes.push(Flash::error(title).with_message(summary));

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        AuthTemplate {
            page,
            tab,
            email: email.trim().to_string(),
            errors,
        },
    )
        .into_response()
}

/// Store a fresh sign in under a new session id.
async fn establish(session: &Session, auth: &AuthState) -> Result<(), AppError> {
    session.cycle_id().await?;
    set_auth_state(session, auth).await?;
    set_sentry_user(&auth.user.id, auth.user.email.as_deref());
    Ok(())
}

// =============================================================================
// Routes
// =============================================================================

/// Display the sign in and register forms.
pub async fn auth_page(OptionalAuth(auth): OptionalAuth, page: PageContext) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }
    AuthTemplate::new(page).into_response()
}

/// Sign in with email and password.
#[instrument(skip(state, session, page, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let previous = page.auth.clone();

    match AuthService::new(state.backend())
        .sign_in(&form.email, &form.password, previous.as_ref())
        .await
    {
        Ok(auth) => {
            establish(&session, &auth).await?;
            add_breadcrumb("auth", "Signed in", None);
            tracing::info!(user_id = %auth.user.id, "User signed in");
            push_flash(
                &session,
                Flash::success("Sign in successful")
                    .with_message(format!("Welcome back, {}!", auth.display_name())),
            )
            .await;
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::Validation(errors)) => Ok(invalid_form(
            page,
            AuthTab::SignIn,
            &form.email,
            "Sign in failed",
            errors,
        )),
        Err(e) => {
            tracing::warn!("Sign in failed: {e}");
            push_flash(
                &session,
                Flash::error("Sign in failed").with_message(e.user_message()),
            )
            .await;
            Ok(Redirect::to("/auth").into_response())
        }
    }
}

/// Register a new account.
///
/// When the backend auto-confirms the account the visitor is signed in
/// right away; otherwise they are asked to confirm their email first.
#[instrument(skip(state, session, page, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.backend())
        .sign_up(&form.email, &form.password, &form.confirm_password)
        .await
    {
        Ok(SignUpOutcome::SignedIn(auth)) => {
            establish(&session, &auth).await?;
            tracing::info!(user_id = %auth.user.id, "User registered and signed in");
            push_flash(
                &session,
                Flash::success("Sign up successful").with_message("Welcome to Bottleshop!"),
            )
            .await;
            Ok(Redirect::to("/").into_response())
        }
        Ok(SignUpOutcome::ConfirmationRequired) => {
            tracing::info!("User registered, confirmation pending");
            push_flash(
                &session,
                Flash::success("Sign up successful")
                    .with_message("Please check your email to confirm your account."),
            )
            .await;
            Ok(Redirect::to("/auth").into_response())
        }
        Err(AuthError::Validation(errors)) => Ok(invalid_form(
            page,
            AuthTab::Register,
            &form.email,
            "Sign up failed",
            errors,
        )),
        Err(e) => {
            tracing::warn!("Sign up failed: {e}");
            push_flash(
                &session,
                Flash::error("Sign up failed").with_message(e.user_message()),
            )
            .await;
            Ok(Redirect::to("/auth").into_response())
        }
    }
}

/// Sign out.
///
/// Local state is cleared even when the backend refuses the revocation.
#[instrument(skip(state, session, auth))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<Redirect, AppError> {
    let revoked = match &auth {
        Some(auth) => AuthService::new(state.backend()).sign_out(auth).await,
        None => Ok(()),
    };

    clear_auth_state(&session).await?;
    clear_sentry_user();

    let flash = match revoked {
        Ok(()) => Flash::success("Signed out successfully"),
        Err(e) => {
            tracing::warn!("Sign out failed: {e}");
            Flash::error("Sign out failed").with_message(e.user_message())
        }
    };
    push_flash(&session, flash).await;

    Ok(Redirect::to("/"))
}
