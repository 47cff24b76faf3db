//! Blob storage for harvested media.
//!
//! [`BlobStore::upload`] is a single awaitable step: it resolves with the
//! public download URL once the object is fully written, or with the error
//! that stopped the write.

use std::future::Future;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::Deserialize;
use swatch_core::AppConfig;

use crate::error::StoreError;

/// Object storage addressed by `/`-separated keys.
pub trait BlobStore {
    /// Writes `bytes` under `key` and returns a publicly resolvable URL.
    fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Firebase Storage over its REST endpoint.
///
/// Use [`FirebaseStorage::open`] for production or
/// [`FirebaseStorage::with_base_url`] to point at a mock server in tests.
pub struct FirebaseStorage {
    client: Client,
    base_url: Url,
    bucket: String,
    auth_token: Option<String>,
}

impl FirebaseStorage {
    /// Opens the bucket named in the application config.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StoreError::InvalidEndpoint`] if the configured base URL does not parse.
    pub fn open(config: &AppConfig) -> Result<Self, StoreError> {
        Self::with_base_url(
            &config.firebase_storage_base_url,
            &config.firebase_storage_bucket,
            config.firebase_auth_token.as_deref(),
            config.request_timeout_secs,
        )
    }

    /// Builds a client against a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StoreError::InvalidEndpoint`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        bucket: &str,
        auth_token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| StoreError::InvalidEndpoint {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            bucket: bucket.to_owned(),
            auth_token: auth_token.map(str::to_owned),
        })
    }

    /// Ends the handle's lifecycle. Pending requests have already resolved
    /// because every upload is awaited by its caller.
    pub fn close(self) {
        tracing::debug!(bucket = %self.bucket, "blob store handle closed");
    }

    fn objects_url(&self) -> Result<Url, StoreError> {
        self.endpoint(&format!("v0/b/{}/o", self.bucket))
    }

    fn object_url(&self, key: &str) -> Result<Url, StoreError> {
        let encoded = utf8_percent_encode(key, NON_ALPHANUMERIC);
        self.endpoint(&format!("v0/b/{}/o/{encoded}", self.bucket))
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::InvalidEndpoint {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// The URL the Firebase SDK's `getDownloadURL` would hand out.
    fn download_url(&self, key: &str, token: &str) -> Result<String, StoreError> {
        let mut url = self.object_url(key)?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url.to_string())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Attaches a fresh download token to an object that came back without one.
    async fn mint_download_token(&self, key: &str) -> Result<String, StoreError> {
        let token = uuid::Uuid::new_v4().to_string();
        let url = self.object_url(key)?;
        let body = serde_json::json!({
            "metadata": { "firebaseStorageDownloadTokens": token }
        });
        let response = self
            .authorize(self.client.patch(url.clone()))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(token)
    }
}

impl BlobStore for FirebaseStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let mut url = self.objects_url()?;
        url.query_pairs_mut().append_pair("name", key);

        let response = self
            .authorize(self.client.post(url.clone()))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let metadata: ObjectMetadata =
            serde_json::from_str(&body).map_err(|e| StoreError::Json {
                context: format!("upload response for {key}"),
                source: e,
            })?;

        let token = match metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
        {
            Some(token) => token.to_owned(),
            None => self.mint_download_token(&metadata.name).await?,
        };

        let download_url = self.download_url(&metadata.name, &token)?;
        tracing::debug!(key, "blob uploaded");
        Ok(download_url)
    }
}

/// Content type for a staged file, judged by its extension.
#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}
