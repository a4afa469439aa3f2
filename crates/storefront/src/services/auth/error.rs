//! Authentication error types.

use thiserror::Error;

use bottleshop_core::ValidationErrors;

use crate::backend::BackendError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form input failed validation; nothing was sent to the backend.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Wrong email or password, or any other rejection of the sign in.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The backend failed or rejected the request.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl AuthError {
    /// Message for the failure notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors
                .iter()
                .next()
                .map_or_else(|| "Please check the form".to_string(), |e| e.message.clone()),
            Self::InvalidCredentials(message) => message.clone(),
            Self::Backend(e) => e.user_message(),
        }
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
