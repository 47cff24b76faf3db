use std::time::Duration;

use reqwest::Client;
use swatch_core::AppConfig;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// HTTP client for product media.
///
/// A fetch counts as successful only once a 2xx response body has been read
/// in full. Anything else is retried up to `max_attempts` requests in total.
pub struct AssetFetcher {
    client: Client,
    max_attempts: u32,
    backoff_base_ms: u64,
}

impl AssetFetcher {
    /// Creates a fetcher with the given timeout, `User-Agent` and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_attempts: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_attempts,
            backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.fetch_max_attempts,
            config.fetch_backoff_base_ms,
        )
    }

    /// Downloads `url` and returns its body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] if the last attempt got a non-2xx response.
    /// - [`ScraperError::Http`] if the last attempt failed in transport or while
    ///   reading the body.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        retry_with_backoff(self.max_attempts, self.backoff_base_ms, || async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }
            let body = response.bytes().await?;
            Ok(body.to_vec())
        })
        .await
    }
}
