//! Profile rows: lookups, updates and admin grants.

use serde_json::json;
use tracing::instrument;

use bottleshop_core::{ProfileUpdate, UserId, UserProfile};

use crate::backend::conversions::convert_profile;
use crate::backend::rows::ProfileRow;
use crate::backend::{BackendClient, BackendError, Query};

/// Access to the `profiles` table on behalf of one caller.
///
/// `token` is the caller's access token; `None` uses the client's API key,
/// which is how the operator CLI (holding the service-role key) calls in.
pub struct ProfileService<'a> {
    backend: &'a BackendClient,
    token: Option<&'a str>,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, token: Option<&'a str>) -> Self {
        Self { backend, token }
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn by_id(&self, id: UserId) -> Result<Option<UserProfile>, BackendError> {
        let row: Option<ProfileRow> = self
            .backend
            .select_one(&Query::table("profiles").select("*").eq("id", id), self.token)
            .await?;
        Ok(row.map(convert_profile))
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn by_username(&self, username: &str) -> Result<Option<UserProfile>, BackendError> {
        let row: Option<ProfileRow> = self
            .backend
            .select_one(
                &Query::table("profiles").select("*").eq("username", username),
                self.token,
            )
            .await?;
        Ok(row.map(convert_profile))
    }

    /// All profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserProfile>, BackendError> {
        let rows: Vec<ProfileRow> = self
            .backend
            .select(
                &Query::table("profiles").select("*").order("created_at", false),
                self.token,
            )
            .await?;
        Ok(rows.into_iter().map(convert_profile).collect())
    }

    /// Apply a partial update and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the profile doesn't exist.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let row: ProfileRow = self
            .backend
            .update(&Query::table("profiles").eq("id", id), update, self.token)
            .await?;
        Ok(convert_profile(row))
    }

    /// Set the admin flag on the profile with `username`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if no profile has that username.
    #[instrument(skip(self))]
    pub async fn grant_admin(&self, username: &str) -> Result<UserProfile, BackendError> {
        let profile = self
            .by_username(username)
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("no profile with username {username}")))?;
        let row: ProfileRow = self
            .backend
            .update(
                &Query::table("profiles").eq("id", profile.id),
                &json!({ "is_admin": true }),
                self.token,
            )
            .await?;
        Ok(convert_profile(row))
    }
}
