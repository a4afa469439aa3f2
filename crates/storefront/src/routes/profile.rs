//! Profile route handlers (signed-in users only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bottleshop_core::{ProfileUpdate, Theme, ValidationErrors};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, set_auth_state};
use crate::models::{AuthState, Flash, push_flash};
use crate::routes::pages::theme_cookie;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar_url: String,
    pub preferred_theme: Option<String>,
}

impl ProfileForm {
    /// Blank username means "leave as is"; a blank avatar clears it.
    fn to_update(&self) -> ProfileUpdate {
        let username = self.username.trim();
        ProfileUpdate {
            username: (!username.is_empty()).then(|| username.to_string()),
            avatar_url: Some(self.avatar_url.clone()),
            preferred_theme: self.preferred_theme.as_deref().and_then(Theme::parse),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub auth: AuthState,
    pub username: String,
    pub avatar_url: String,
    pub preferred_theme: Theme,
    pub errors: ValidationErrors,
}

impl ProfileTemplate {
    fn new(page: PageContext, auth: AuthState) -> Self {
        let profile = auth.profile.as_ref();
        let username = profile
            .and_then(|p| p.username.clone())
            .unwrap_or_default();
        let avatar_url = profile
            .and_then(|p| p.avatar_url.clone())
            .unwrap_or_default();
        let preferred_theme = profile
            .and_then(|p| p.preferred_theme)
            .unwrap_or(page.theme);

        Self {
            page,
            auth,
            username,
            avatar_url,
            preferred_theme,
            errors: ValidationErrors::new(),
        }
    }
}

/// Display the profile of the signed-in user.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn show(RequireAuth(auth): RequireAuth, page: PageContext) -> impl IntoResponse {
    ProfileTemplate::new(page, auth)
}

/// Update username, avatar and theme preference.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    RequireAuth(auth): RequireAuth,
    mut page: PageContext,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let update = form.to_update();

    match AuthService::new(state.backend())
        .update_profile(&auth, update.clone())
        .await
    {
        Ok(updated) => {
            set_auth_state(&session, &updated).await?;
            tracing::info!(admin = updated.is_admin(), "Profile updated");
            push_flash(&session, Flash::success("Profile updated successfully")).await;

            let jar = match update.preferred_theme {
                Some(theme) => jar.add(theme_cookie(theme)),
                None => jar,
            };
            Ok((jar, Redirect::to("/profile")).into_response())
        }
        Err(AuthError::Validation(errors)) => {
            page.flashes.push(
                Flash::error("Profile update failed").with_message(errors.to_string()),
            );
            let mut template = ProfileTemplate::new(page, auth);
            template.username = form.username.trim().to_string();
            template.avatar_url = form.avatar_url.trim().to_string();
            template.errors = errors;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(e) => {
            tracing::error!("Profile update failed: {e}");
            push_flash(
                &session,
                Flash::error("Profile update failed").with_message(e.user_message()),
            )
            .await;
            Ok(Redirect::to("/profile").into_response())
        }
    }
}
