//! Client for the hosted backend.
//!
//! # Architecture
//!
//! The backend is a Supabase-style project exposing two HTTP APIs:
//!
//! - `/rest/v1/{table}` - a PostgREST table API (`products`, `inventory`,
//!   `categories`, `profiles`)
//! - `/auth/v1/*` - a GoTrue auth API (sign up, password sign in, token
//!   refresh, sign out, current user)
//!
//! Every request carries the project's API key in the `apikey` header and a
//! bearer token: the signed-in user's access token when there is one,
//! otherwise the API key itself. Row-level security on the backend decides
//! what each caller may read or write.
//!
//! The backend is the source of truth. Nothing is synced locally; the catalog
//! service caches whole-catalog reads for a short TTL.
//!
//! # Example
//!
//! ```rust,ignore
//! use bottleshop_storefront::backend::{BackendClient, Query};
//!
//! let client = BackendClient::new(&config.supabase);
//! let rows: Vec<ProductRow> = client
//!     .select(&Query::table("products").order("name", true), None)
//!     .await?;
//! ```

mod auth;
mod client;
pub mod conversions;
mod query;
pub mod rows;

pub use auth::{AuthSessionResponse, AuthUser, SignUpResponse};
pub use client::BackendClient;
pub use query::Query;

use serde::Deserialize;
use thiserror::Error;

/// PostgREST error code for "the result contains 0 rows" on a single-row read.
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error body.
    #[error("{message}")]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// PostgREST/GoTrue error code, when present.
        code: Option<String>,
        /// Human-readable message suitable for a notification.
        message: String,
    },

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The response body did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A row that had to exist was missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The bearer token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl BackendError {
    /// Whether the error means "no such row" rather than a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { code, .. } => code.as_deref() == Some(NO_ROWS_CODE),
            _ => false,
        }
    }

    /// Message to show the user in a notification.
    ///
    /// API messages come from the backend and are meant for end users;
    /// transport and parse failures are replaced with a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) => message.clone(),
            Self::RateLimited(_) => "Too many requests, please try again shortly".to_string(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::Http(_) | Self::Url(_) | Self::Parse(_) => "The store is temporarily unavailable".to_string(),
        }
    }
}

/// Error body shared by PostgREST and GoTrue.
///
/// PostgREST uses `code`/`message`/`details`/`hint`; GoTrue uses `error` and
/// `error_description` on OAuth-style endpoints and `msg`/`error_code`
/// elsewhere.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl ApiErrorBody {
    pub(crate) fn into_error(self, status: u16) -> BackendError {
        let code = match self.code {
            Some(serde_json::Value::String(code)) => Some(code),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => self.error_code,
        };
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .or(self.details)
            .unwrap_or_else(|| format!("HTTP {status}"));
        BackendError::Api {
            status,
            code,
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str, status: u16) -> BackendError {
        serde_json::from_str::<ApiErrorBody>(json)
            .unwrap()
            .into_error(status)
    }

    #[test]
    fn test_postgrest_error_body() {
        let err = parse(
            r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned","details":"The result contains 0 rows","hint":null}"#,
            406,
        );
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("JSON object requested"));
    }

    #[test]
    fn test_gotrue_token_error_body() {
        let err = parse(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
            400,
        );
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_gotrue_msg_error_body() {
        let err = parse(
            r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#,
            422,
        );
        match err {
            BackendError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 422);
                assert_eq!(code.as_deref(), Some("422"));
                assert_eq!(message, "User already registered");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_error_body_uses_status() {
        let err = parse("{}", 500);
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_transport_errors_are_hidden_from_users() {
        let err = BackendError::Parse(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(err.user_message(), "The store is temporarily unavailable");
    }
}
