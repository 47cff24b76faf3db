//! In-memory stand-ins for the browser page and the Firebase stores.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde_json::{Map, Value};
use swatch_core::{ProductPage, Variant};
use swatch_scraper::{PageExtractor, ScraperError};
use swatch_store::{BlobStore, HierarchicalStore, StoreError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) const BASE_URL: &str = "https://shop.example.com/products/runner";

/// A page whose rendered variant changes on `goto`.
pub(crate) struct FakePage {
    pub current: Variant,
    pub product: ProductPage,
    pub identifiers: Vec<String>,
    pub video: Option<String>,
    pub by_url: HashMap<String, Variant>,
    pub broken_urls: HashSet<String>,
    /// Colour names whose extraction errors.
    pub unreadable: HashSet<String>,
    pub visited: Vec<String>,
    pub extractions: usize,
}

impl FakePage {
    pub(crate) fn new(first: Variant) -> Self {
        Self {
            current: first,
            product: ProductPage::default(),
            identifiers: Vec::new(),
            video: None,
            by_url: HashMap::new(),
            broken_urls: HashSet::new(),
            unreadable: HashSet::new(),
            visited: Vec::new(),
            extractions: 0,
        }
    }

    pub(crate) fn with_variant(mut self, identifier: &str, variant: Variant) -> Self {
        self.by_url.insert(format!("{BASE_URL}-{identifier}"), variant);
        self
    }

    pub(crate) fn with_broken(mut self, url: &str) -> Self {
        self.broken_urls.insert(url.to_owned());
        self
    }

    pub(crate) fn with_unreadable(mut self, color_name: &str) -> Self {
        self.unreadable.insert(color_name.to_owned());
        self
    }
}

impl PageExtractor for FakePage {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        self.visited.push(url.to_owned());
        if self.broken_urls.contains(url) {
            return Err(ScraperError::UnexpectedStatus {
                status: 502,
                url: url.to_owned(),
            });
        }
        if let Some(variant) = self.by_url.get(url) {
            self.current = variant.clone();
        }
        Ok(())
    }

    async fn dismiss_modal(&mut self) -> Result<bool, ScraperError> {
        Ok(false)
    }

    async fn list_color_variant_identifiers(&mut self) -> Result<Vec<String>, ScraperError> {
        Ok(self.identifiers.clone())
    }

    async fn extract_current_variant(&mut self) -> Result<Variant, ScraperError> {
        self.extractions += 1;
        if self.unreadable.contains(&self.current.color_name) {
            return Err(ScraperError::Deserialize {
                context: "current variant".to_owned(),
                source: serde_json::from_str::<Value>("{").unwrap_err(),
            });
        }
        Ok(self.current.clone())
    }

    async fn extract_product(&mut self) -> Result<ProductPage, ScraperError> {
        Ok(self.product.clone())
    }

    async fn probe_video(&mut self) -> Result<Option<String>, ScraperError> {
        Ok(self.video.clone())
    }
}

/// Hands out a download URL per key; keys containing `fail_on` are rejected.
#[derive(Default)]
pub(crate) struct MemoryBlobs {
    pub fail_on: Option<&'static str>,
}

impl BlobStore for MemoryBlobs {
    async fn upload(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        if self.fail_on.is_some_and(|needle| key.contains(needle)) {
            return Err(StoreError::UnexpectedStatus {
                status: 500,
                url: key.to_owned(),
            });
        }
        Ok(format!("https://dl.example.com/{key}"))
    }
}

#[derive(Default)]
pub(crate) struct RecordingStore {
    pub updates: Mutex<Vec<(String, Map<String, Value>)>>,
    /// The first update to this path is rejected; later ones succeed.
    pub fail_once_at: Mutex<Option<String>>,
}

impl RecordingStore {
    pub(crate) fn failing_once_at(path: &str) -> Self {
        Self {
            fail_once_at: Mutex::new(Some(path.to_owned())),
            ..Self::default()
        }
    }
}

impl HierarchicalStore for RecordingStore {
    async fn set(&self, _path: &str, _value: Value) -> Result<(), StoreError> {
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        {
            let mut fail_once_at = self.fail_once_at.lock().unwrap();
            if fail_once_at.as_deref() == Some(path) {
                *fail_once_at = None;
                return Err(StoreError::UnexpectedStatus {
                    status: 503,
                    url: path.to_owned(),
                });
            }
        }
        self.updates
            .lock()
            .unwrap()
            .push((path.to_owned(), fields));
        Ok(())
    }
}

pub(crate) fn variant(name: &str, images: Vec<String>) -> Variant {
    Variant {
        color_name: name.to_owned(),
        color_type: "classic".to_owned(),
        rgb_or_pattern: "rgb(1, 2, 3)".to_owned(),
        images,
    }
}

pub(crate) fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

/// Serves `x.png`, `y.png`, `z.png`, `w.png` and `clip.mp4`.
pub(crate) async fn media_server() -> MockServer {
    let server = MockServer::start().await;
    for name in ["x.png", "y.png", "z.png", "w.png", "clip.mp4"] {
        Mock::given(method("GET"))
            .and(path(format!("/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
            .mount(&server)
            .await;
    }
    server
}

pub(crate) fn media(server: &MockServer, name: &str) -> String {
    format!("{}/{name}", server.uri())
}
