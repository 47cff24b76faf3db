//! Hierarchical key-path database.
//!
//! Writes are path-scoped: `set` overwrites the value at a path, `update`
//! merges the given fields into it. The store performs the merge; callers
//! never read before writing.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::{Map, Value};
use swatch_core::AppConfig;

use crate::error::StoreError;

/// A database addressed by `/`-separated paths.
pub trait HierarchicalStore {
    /// Overwrites whatever lives at `path` with `value`.
    fn set(&self, path: &str, value: Value) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Merges `fields` into the object at `path`, leaving other children intact.
    fn update(
        &self,
        path: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Firebase Realtime Database over its REST endpoint (`PUT`/`PATCH` on
/// `{path}.json`).
pub struct FirebaseDatabase {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl FirebaseDatabase {
    /// Opens the database named in the application config.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StoreError::InvalidEndpoint`] if the database URL does not parse.
    pub fn open(config: &AppConfig) -> Result<Self, StoreError> {
        Self::with_base_url(
            &config.firebase_database_url,
            config.firebase_auth_token.as_deref(),
            config.request_timeout_secs,
        )
    }

    /// Builds a client against an explicit database root URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StoreError::InvalidEndpoint`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        auth_token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| StoreError::InvalidEndpoint {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            auth_token: auth_token.map(str::to_owned),
        })
    }

    /// Ends the handle's lifecycle.
    pub fn close(self) {
        tracing::debug!(database = %self.base_url, "database handle closed");
    }

    fn path_url(&self, path: &str) -> Result<Url, StoreError> {
        let trimmed = path.trim_matches('/');
        let mut url = self
            .base_url
            .join(&format!("{trimmed}.json"))
            .map_err(|e| StoreError::InvalidEndpoint {
                url: format!("{}{trimmed}.json", self.base_url),
                reason: e.to_string(),
            })?;
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &Url) -> Result<(), StoreError> {
        // Transport errors carry the request URL, `auth` token included.
        let response = request.send().await.map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact_auth(url),
            });
        }
        Ok(())
    }
}

impl HierarchicalStore for FirebaseDatabase {
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let url = self.path_url(path)?;
        let request = self.client.put(url.clone()).json(&value);
        self.send(request, &url).await
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let url = self.path_url(path)?;
        let request = self.client.patch(url.clone()).json(&fields);
        self.send(request, &url).await
    }
}

/// Renders `url` without its `auth` query parameter for error messages.
fn redact_auth(url: &Url) -> String {
    let mut clean = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "auth")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(kept);
    }
    clean.to_string()
}
