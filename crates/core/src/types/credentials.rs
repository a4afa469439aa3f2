//! Sign-in credentials: email addresses and passwords.
//!
//! The hosted auth backend does the real verification; these types only
//! reject input that could never succeed so no request is wasted on it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input is not of the form `local@domain.tld`.
    #[error("please enter a valid email address")]
    Malformed,
}

/// An email address, trimmed and structurally checked.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one `@`, with a non-empty local part
/// - A domain containing a dot that neither starts nor ends the domain
/// - No whitespace
///
/// ## Examples
///
/// ```
/// use bottleshop_core::Email;
///
/// assert!(Email::parse("orders@bottleshop.test").is_ok());
/// assert!(Email::parse(" Jo@Example.com ").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("user@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, too long, or not
    /// shaped like an address.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::Malformed)?;
        if local.is_empty() || domain.contains('@') {
            return Err(EmailError::Malformed);
        }
        let dotted = domain
            .split_once('.')
            .is_some_and(|(host, _)| !host.is_empty());
        if !dotted || domain.ends_with('.') {
            return Err(EmailError::Malformed);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when validating a [`Password`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("passwords don't match")]
    Mismatch,
}

/// A password that meets the backend's minimum length.
///
/// `Debug` is redacted so a password never reaches the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum accepted length, in characters.
    pub const MIN_LENGTH: usize = 6;

    /// Validate a password.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::TooShort` below [`Self::MIN_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, PasswordError> {
        if s.chars().count() < Self::MIN_LENGTH {
            return Err(PasswordError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Validate a password and its confirmation.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::Mismatch` if the two differ, or any error of
    /// [`Self::parse`].
    pub fn parse_confirmed(password: &str, confirm: &str) -> Result<Self, PasswordError> {
        let parsed = Self::parse(password)?;
        if password != confirm {
            return Err(PasswordError::Mismatch);
        }
        Ok(parsed)
    }

    /// Expose the plaintext for sending to the auth backend.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name+tag@sub.example.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_trims() {
        let email = Email::parse("  buyer@shop.test\n").unwrap();
        assert_eq!(email.as_str(), "buyer@shop.test");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("no-at"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@shop.test"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@b@shop.test"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@localhost"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@.test"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@shop."), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a b@shop.test"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(Email::parse(&long), Err(EmailError::TooLong { .. })));
    }

    #[test]
    fn test_password_min_length() {
        assert!(Password::parse("12345").is_err());
        assert!(Password::parse("123456").is_ok());
    }

    #[test]
    fn test_password_confirmation() {
        assert_eq!(
            Password::parse_confirmed("hunter22", "hunter23"),
            Err(PasswordError::Mismatch)
        );
        assert!(Password::parse_confirmed("hunter22", "hunter22").is_ok());
        // Length is reported before mismatch
        assert_eq!(
            Password::parse_confirmed("abc", "abd"),
            Err(PasswordError::TooShort { min: 6 })
        );
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::parse("correct horse").unwrap();
        assert!(!format!("{password:?}").contains("horse"));
    }
}
