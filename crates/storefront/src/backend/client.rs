//! HTTP plumbing for the PostgREST table API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiErrorBody, BackendError, Query};
use crate::config::BackendConfig;

/// Media type asking PostgREST for a single JSON object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// How many characters of an unexpected body to log.
const LOGGED_BODY_CHARS: usize = 500;

/// Client for the hosted backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url,
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Base URL of the backend project.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(super) fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn table_url(&self, query: &Query) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", query.table_name()))?;
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Start a request with the API key and bearer token applied.
    ///
    /// Without a user token the API key doubles as the bearer, which is how
    /// anonymous (and service-role) callers authenticate.
    pub(super) fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let api_key = self.inner.api_key.expose_secret();
        let bearer = token.unwrap_or(api_key);
        self.inner
            .client
            .request(method, url)
            .header("apikey", api_key)
            .bearer_auth(bearer)
    }

    /// Send a request and return the body of a successful response.
    pub(super) async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let error = serde_json::from_str::<ApiErrorBody>(&body)
            .unwrap_or_default()
            .into_error(status.as_u16());

        if error.is_not_found() {
            debug!(status = %status, "Backend returned no rows");
            return Err(error);
        }

        tracing::warn!(
            status = %status,
            body = %body.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
            "Backend returned non-success status"
        );

        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized(error.user_message()));
        }
        Err(error)
    }

    /// Send a request and parse the JSON body.
    pub(super) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    // =========================================================================
    // Table API
    // =========================================================================

    /// Read every row matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the rows don't parse as `T`.
    #[instrument(skip(self, token), fields(table = %query.table_name()))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        query: &Query,
        token: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(query)?;
        self.send_json(self.request(Method::GET, url, token)).await
    }

    /// Read exactly one row, or `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, more than one row matches, or
    /// the row doesn't parse as `T`.
    #[instrument(skip(self, token), fields(table = %query.table_name()))]
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        query: &Query,
        token: Option<&str>,
    ) -> Result<Option<T>, BackendError> {
        let url = self.table_url(query)?;
        let request = self
            .request(Method::GET, url, token)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT);
        match self.send_json(request).await {
            Ok(row) => Ok(Some(row)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Insert one row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the row.
    #[instrument(skip(self, row, token), fields(table = %table))]
    pub async fn insert<B, T>(
        &self,
        table: &str,
        row: &B,
        token: Option<&str>,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(&Query::table(table))?;
        let request = self
            .request(Method::POST, url, token)
            .header("Prefer", "return=representation")
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .json(row);
        self.send_json(request).await
    }

    /// Apply `changes` to the single row matching `query` and return it.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if no row matches, or any request
    /// error.
    #[instrument(skip(self, changes, token), fields(table = %query.table_name()))]
    pub async fn update<B, T>(
        &self,
        query: &Query,
        changes: &B,
        token: Option<&str>,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if !query.has_filters() {
            return Err(BackendError::NotFound(format!(
                "refusing unfiltered update of {}",
                query.table_name()
            )));
        }
        let url = self.table_url(query)?;
        let request = self
            .request(Method::PATCH, url, token)
            .header("Prefer", "return=representation")
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .json(changes);
        self.send_json(request).await.map_err(|e| {
            if e.is_not_found() {
                BackendError::NotFound(format!("no matching row in {}", query.table_name()))
            } else {
                e
            }
        })
    }

    /// Delete the rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(table = %query.table_name()))]
    pub async fn delete(&self, query: &Query, token: Option<&str>) -> Result<(), BackendError> {
        if !query.has_filters() {
            return Err(BackendError::NotFound(format!(
                "refusing unfiltered delete of {}",
                query.table_name()
            )));
        }
        let url = self.table_url(query)?;
        let request = self
            .request(Method::DELETE, url, token)
            .header("Prefer", "return=minimal");
        self.send(request).await.map(|_| ())
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: Url::parse(url).unwrap(),
            api_key: SecretString::from("sb-test-key"),
        })
    }

    #[test]
    fn test_table_url_with_filters() {
        let client = client("https://project.supabase.test");
        let url = client
            .table_url(&Query::table("inventory").select("*").eq("product_id", "p 1"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.test/rest/v1/inventory?select=*&product_id=eq.p+1"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = client("http://127.0.0.1:9000/backend");
        let url = client.endpoint("auth/v1/health").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/backend/auth/v1/health");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", client("https://project.supabase.test"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sb-test-key"));
    }
}
