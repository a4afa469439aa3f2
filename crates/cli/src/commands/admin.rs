//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! bottleshop admin grant --username sam
//! bottleshop admin list
//! ```
//!
//! Admin access is the `is_admin` flag on a profile. Users sign up through
//! the storefront first; these commands only flip the flag.

use thiserror::Error;

use bottleshop_storefront::backend::BackendError;
use bottleshop_storefront::config::ConfigError;
use bottleshop_storefront::services::ProfileService;

use super::connect;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Backend settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No profile has that username.
    #[error("No profile with username: {0}")]
    UnknownUser(String),

    /// The backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Grant admin access to the profile with `username`.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if no profile matches.
pub async fn grant(username: &str) -> Result<(), AdminError> {
    let username = username.trim();
    let (_, client) = connect()?;

    tracing::info!("Granting admin access to {username}...");
    let profile = ProfileService::new(&client, None)
        .grant_admin(username)
        .await
        .map_err(|e| match e {
            BackendError::NotFound(_) => AdminError::UnknownUser(username.to_owned()),
            other => AdminError::Backend(other),
        })?;

    tracing::info!(user_id = %profile.id, "{username} is now an admin");
    Ok(())
}

/// List every profile, newest first.
///
/// # Errors
///
/// Returns an error if the backend can't be reached.
pub async fn list() -> Result<(), AdminError> {
    let (_, client) = connect()?;
    let profiles = ProfileService::new(&client, None).list().await?;

    tracing::info!("{} profile(s)", profiles.len());
    for profile in profiles {
        let created = profile
            .created_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d").to_string());
        tracing::info!(
            "  {} {:<24} {:<10} {}",
            profile.id,
            profile.username.as_deref().unwrap_or("(no username)"),
            if profile.is_admin() { "admin" } else { "customer" },
            created,
        );
    }
    Ok(())
}
