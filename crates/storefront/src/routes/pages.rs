//! Static pages, the contact form and the theme toggle.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bottleshop_core::{Email, Theme, ValidationErrors};

use crate::filters;
use crate::middleware::PageContext;
use crate::middleware::page::{THEME_COOKIE, theme_from_cookies};
use crate::models::{Flash, push_flash};
use crate::routes::local_redirect;

/// How long the theme cookie lives.
const THEME_COOKIE_DAYS: i64 = 365;

/// Longest accepted contact message, in characters.
const MAX_MESSAGE_LENGTH: usize = 2000;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub page: PageContext,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub message: String,
    pub errors: ValidationErrors,
}

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Please tell us your name");
        }
        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", e.to_string()))
            .ok();
        let message = self.message.trim();
        if message.is_empty() {
            errors.add("message", "Please enter a message");
        } else if message.chars().count() > MAX_MESSAGE_LENGTH {
            errors.add(
                "message",
                format!("Message must be at most {MAX_MESSAGE_LENGTH} characters"),
            );
        }

        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

/// Theme toggle form data.
#[derive(Debug, Default, Deserialize)]
pub struct ThemeForm {
    pub return_to: Option<String>,
}

/// Build the cookie that remembers `theme`.
#[must_use]
pub fn theme_cookie(theme: Theme) -> Cookie<'static> {
    Cookie::build((THEME_COOKIE, theme.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time_days(THEME_COOKIE_DAYS))
        .build()
}

fn time_days(days: i64) -> tower_sessions::cookie::time::Duration {
    tower_sessions::cookie::time::Duration::days(days)
}

/// Display the about page.
pub async fn about(page: PageContext) -> impl IntoResponse {
    AboutTemplate { page }
}

/// Display the contact form.
pub async fn contact(page: PageContext) -> impl IntoResponse {
    ContactTemplate {
        page,
        name: String::new(),
        email: String::new(),
        message: String::new(),
        errors: ValidationErrors::new(),
    }
}

/// Accept a contact message. Nothing is sent anywhere; the message is
/// logged and acknowledged.
#[instrument(skip_all)]
pub async fn submit_contact(
    session: Session,
    mut page: PageContext,
    Form(form): Form<ContactForm>,
) -> Response {
    match form.validate() {
        Ok(email) => {
            tracing::info!(
                email = %email,
                length = form.message.trim().chars().count(),
                "Contact message received"
            );
            push_flash(
                &session,
                Flash::success("Message sent")
                    .with_message("Thanks for getting in touch. We'll reply soon."),
            )
            .await;
            Redirect::to("/contact").into_response()
        }
        Err(errors) => {
            page.flashes
                .push(Flash::error("Message not sent").with_message(errors.to_string()));
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                ContactTemplate {
                    page,
                    name: form.name.trim().to_string(),
                    email: form.email.trim().to_string(),
                    message: form.message,
                    errors,
                },
            )
                .into_response()
        }
    }
}

/// Flip between light and dark.
pub async fn toggle_theme(jar: CookieJar, Form(form): Form<ThemeForm>) -> impl IntoResponse {
    let theme = theme_from_cookies(&jar).toggled();
    let back = Redirect::to(local_redirect(form.return_to.as_deref(), "/"));
    (jar.add(theme_cookie(theme)), back)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_contact_validation_collects_all_fields() {
        let errors = form("", "nope", " ").validate().unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("message").is_some());
    }

    #[test]
    fn test_contact_validation_accepts_good_input() {
        assert!(form("Sam", "sam@shop.test", "Do you deliver on Sundays?")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_theme_cookie_is_long_lived() {
        let cookie = theme_cookie(Theme::Light);
        assert_eq!(cookie.value(), "light");
        assert_eq!(cookie.max_age(), Some(time_days(THEME_COOKIE_DAYS)));
    }
}
