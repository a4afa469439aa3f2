//! User profiles and display preferences.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::validation::ValidationErrors;

/// Color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a cookie or form value; anything unrecognized is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `profiles` table. The id equals the auth user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub preferred_theme: Option<Theme>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }

    /// Up to two uppercase initials for the avatar fallback.
    ///
    /// Uses the username when set, otherwise the local part of `email`.
    #[must_use]
    pub fn initials(&self, email: &str) -> String {
        let source = self
            .username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default());
        initials(source)
    }
}

/// Up to two uppercase initials from the words of `name`.
#[must_use]
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let picked: String = if words.len() >= 2 {
        words.iter().take(2).filter_map(|w| w.chars().next()).collect()
    } else {
        name.trim().chars().take(2).collect()
    };
    picked.to_uppercase()
}

/// A partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// `Some("")` clears the avatar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_theme: Option<Theme>,
}

impl ProfileUpdate {
    /// Minimum username length, in characters.
    pub const MIN_USERNAME_LENGTH: usize = 2;

    /// Trim text fields and check them.
    ///
    /// # Errors
    ///
    /// Returns every failing field: a username shorter than
    /// [`Self::MIN_USERNAME_LENGTH`] or an avatar that is neither empty nor
    /// an absolute URL.
    pub fn validate(mut self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(username) = self.username.as_mut() {
            *username = username.trim().to_owned();
            if username.chars().count() < Self::MIN_USERNAME_LENGTH {
                errors.add(
                    "username",
                    format!(
                        "Username must be at least {} characters",
                        Self::MIN_USERNAME_LENGTH
                    ),
                );
            }
        }

        if let Some(avatar) = self.avatar_url.as_mut() {
            *avatar = avatar.trim().to_owned();
            if !avatar.is_empty() && url::Url::parse(avatar).is_err() {
                errors.add("avatar_url", "Please enter a valid URL");
            }
        }

        errors.into_result(self)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.avatar_url.is_none() && self.preferred_theme.is_none()
    }
}
