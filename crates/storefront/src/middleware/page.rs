//! Per-request page context shared by every full-page template.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tower_sessions::Session;

use bottleshop_core::{Cart, Theme};

use crate::models::{AuthState, Flash, load_cart, session_keys, take_flashes};

/// Name of the cookie holding the visitor's theme.
pub const THEME_COOKIE: &str = "theme";

/// Everything the layout needs: who is signed in, the cart, the theme and
/// pending notifications.
///
/// Extracting a `PageContext` consumes the pending notifications, so only
/// handlers that render a page should ask for one.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub auth: Option<AuthState>,
    pub cart: Cart,
    pub theme: Theme,
    pub flashes: Vec<Flash>,
    /// Request path, for highlighting the active nav link.
    pub path: String,
}

impl PageContext {
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.auth.is_some()
    }

    /// Whether to show the admin link. Display only; the routes check
    /// through `RequireAdmin`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.auth.as_ref().is_some_and(AuthState::is_admin)
    }

    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.cart.count()
    }

    #[must_use]
    pub fn user_initials(&self) -> String {
        self.auth.as_ref().map(AuthState::initials).unwrap_or_default()
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        self.auth
            .as_ref()
            .map(AuthState::display_name)
            .unwrap_or_default()
    }

    /// Whether `prefix` is the active section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(prefix)
        }
    }
}

/// Read the theme cookie, falling back to the default (dark).
#[must_use]
pub fn theme_from_cookies(jar: &CookieJar) -> Theme {
    jar.get(THEME_COOKIE)
        .and_then(|c| Theme::parse(c.value()))
        .unwrap_or_default()
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let theme = theme_from_cookies(&CookieJar::from_headers(&parts.headers));
        let path = parts.uri.path().to_string();

        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self {
                auth: None,
                cart: Cart::default(),
                theme,
                flashes: Vec::new(),
                path,
            });
        };

        let auth = session
            .get::<AuthState>(session_keys::AUTH)
            .await
            .ok()
            .flatten();

        Ok(Self {
            auth,
            cart: load_cart(session).await,
            theme,
            flashes: take_flashes(session).await,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Cookie;

    use super::*;

    #[test]
    fn test_theme_defaults_to_dark() {
        assert_eq!(theme_from_cookies(&CookieJar::new()), Theme::Dark);

        let jar = CookieJar::new().add(Cookie::new(THEME_COOKIE, "light"));
        assert_eq!(theme_from_cookies(&jar), Theme::Light);

        let jar = CookieJar::new().add(Cookie::new(THEME_COOKIE, "sepia"));
        assert_eq!(theme_from_cookies(&jar), Theme::Dark);
    }
}
