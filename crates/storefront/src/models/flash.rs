//! One-shot notifications carried across a redirect.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    /// CSS modifier for the toast.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "toast--success",
            Self::Info => "toast--info",
            Self::Error => "toast--error",
        }
    }
}

/// A toast shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub title: String,
    pub message: Option<String>,
}

impl Flash {
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            title: title.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            title: title.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            title: title.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Queue a notification for the next page render.
///
/// Session failures are logged and the notification dropped.
pub async fn push_flash(session: &Session, flash: Flash) {
    let mut flashes: Vec<Flash> = session
        .get(session_keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    flashes.push(flash);
    if let Err(e) = session.insert(session_keys::FLASHES, flashes).await {
        tracing::error!("Failed to store notification in session: {e}");
    }
}

/// Remove and return every pending notification.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(session_keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push_flash(&session, Flash::success("Sign in successful")).await;
        push_flash(
            &session,
            Flash::error("Sign out failed").with_message("network down"),
        )
        .await;

        let flashes = take_flashes(&session).await;
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].title, "Sign in successful");
        assert_eq!(flashes[1].message.as_deref(), Some("network down"));

        assert!(take_flashes(&session).await.is_empty());
    }
}
