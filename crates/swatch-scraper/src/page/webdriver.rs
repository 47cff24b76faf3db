use std::time::Duration;

use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde::de::DeserializeOwned;
use swatch_core::{parse_swatch_labels, AppConfig, ProductPage, RawVariant, Variant};

use super::layout;
use super::PageExtractor;
use crate::error::ScraperError;

/// Navigation wait used when no page-load timeout is configured. WebDriver
/// has no "infinite" page-load value; this is `i32::MAX` milliseconds
/// (about 24.8 days).
const UNBOUNDED_PAGE_LOAD: Duration = Duration::from_millis(2_147_483_647);

/// Page-load timeout to send to the driver; `0` means wait indefinitely.
fn page_load_timeout(secs: u64) -> Duration {
    if secs == 0 {
        UNBOUNDED_PAGE_LOAD
    } else {
        Duration::from_secs(secs).min(UNBOUNDED_PAGE_LOAD)
    }
}

/// A browser tab driven over WebDriver.
pub struct WebDriverPage {
    client: Client,
    optional_wait: Duration,
}

impl WebDriverPage {
    /// Opens a session against the configured WebDriver endpoint with a
    /// 1920×1080 window.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Session`] if no session can be started, or
    /// [`ScraperError::WebDriver`] if the window or timeouts cannot be set.
    pub async fn connect(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = ClientBuilder::native()
            .connect(&config.webdriver_url)
            .await?;
        client.set_window_size(1920, 1080).await?;
        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                Some(page_load_timeout(config.page_load_timeout_secs)),
                None,
            ))
            .await?;
        tracing::debug!(webdriver = %config.webdriver_url, "browser session started");
        Ok(Self {
            client,
            optional_wait: Duration::from_millis(config.optional_element_timeout_ms),
        })
    }

    /// Ends the browser session.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::WebDriver`] if the session cannot be closed cleanly.
    pub async fn close(self) -> Result<(), ScraperError> {
        self.client.close().await?;
        Ok(())
    }

    async fn run_script<T: DeserializeOwned>(
        &self,
        context: &str,
        script: &str,
    ) -> Result<T, ScraperError> {
        let value = self.client.execute(script, Vec::new()).await?;
        serde_json::from_value(value).map_err(|e| ScraperError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

impl PageExtractor for WebDriverPage {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn dismiss_modal(&mut self) -> Result<bool, ScraperError> {
        let Ok(close) = self
            .client
            .wait()
            .at_most(self.optional_wait)
            .for_element(Locator::Css(layout::MODAL_CLOSE))
            .await
        else {
            return Ok(false);
        };
        close.click().await?;
        Ok(true)
    }

    async fn list_color_variant_identifiers(&mut self) -> Result<Vec<String>, ScraperError> {
        let labels: Vec<String> = self
            .run_script("swatch labels", layout::SWATCH_LABELS_JS)
            .await?;
        Ok(parse_swatch_labels(labels))
    }

    async fn extract_current_variant(&mut self) -> Result<Variant, ScraperError> {
        let raw: RawVariant = self
            .run_script("current variant", layout::CURRENT_VARIANT_JS)
            .await?;
        Ok(Variant::from(raw))
    }

    async fn extract_product(&mut self) -> Result<ProductPage, ScraperError> {
        self.run_script("product page", layout::PRODUCT_JS).await
    }

    async fn probe_video(&mut self) -> Result<Option<String>, ScraperError> {
        if self
            .client
            .wait()
            .at_most(self.optional_wait)
            .for_element(Locator::Css(layout::VIDEO))
            .await
            .is_err()
        {
            return Ok(None);
        }
        let src: Option<String> = self.run_script("video source", layout::VIDEO_SRC_JS).await?;
        Ok(src.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_load_timeout_waits_indefinitely() {
        assert_eq!(page_load_timeout(0), UNBOUNDED_PAGE_LOAD);
        assert!(page_load_timeout(0) > Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn configured_page_load_timeout_is_used_as_is() {
        assert_eq!(page_load_timeout(45), Duration::from_secs(45));
    }

    #[test]
    fn huge_page_load_timeout_is_clamped() {
        assert_eq!(page_load_timeout(u64::MAX), UNBOUNDED_PAGE_LOAD);
    }
}
