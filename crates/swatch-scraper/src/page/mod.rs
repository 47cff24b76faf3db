//! The product page as the harvester sees it.
//!
//! [`PageExtractor`] is the fixed contract between the variant walker and
//! whatever renders the page. [`WebDriverPage`] drives a real browser; tests
//! substitute in-memory fakes.

use std::future::Future;

use swatch_core::{ProductPage, Variant};

use crate::error::ScraperError;

mod layout;
mod webdriver;

pub use webdriver::WebDriverPage;

pub trait PageExtractor {
    /// Navigates to `url` and waits for the document to finish loading.
    fn goto(&mut self, url: &str) -> impl Future<Output = Result<(), ScraperError>> + Send;

    /// Closes the entry modal if one shows up within the optional-element
    /// timeout. Returns whether a modal was dismissed.
    fn dismiss_modal(&mut self) -> impl Future<Output = Result<bool, ScraperError>> + Send;

    /// Colour slugs of every swatch on the page, deduplicated in page order.
    fn list_color_variant_identifiers(
        &mut self,
    ) -> impl Future<Output = Result<Vec<String>, ScraperError>> + Send;

    /// Reads the variant currently rendered.
    fn extract_current_variant(
        &mut self,
    ) -> impl Future<Output = Result<Variant, ScraperError>> + Send;

    /// Reads the product-level fields. Missing elements come back empty.
    fn extract_product(&mut self) -> impl Future<Output = Result<ProductPage, ScraperError>> + Send;

    /// Source URL of the product video, or `None` if no video element shows up
    /// within the optional-element timeout.
    fn probe_video(&mut self) -> impl Future<Output = Result<Option<String>, ScraperError>> + Send;
}
