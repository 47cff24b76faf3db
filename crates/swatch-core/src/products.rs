//! Product and variant model shared by the scraper, the store and the CLI.
//!
//! Raw shapes (`RawVariant`, `ProductPage`) are what the page hands back;
//! `Variant` is the normalized form the pipeline works with; `ProductMeta` and
//! `VariantRecord` are what gets written to the database.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SWATCH_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)color\s+(.*?)\s+\(").expect("valid swatch label regex"));

static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,5}$").expect("valid extension regex"));

/// Variant data exactly as the page reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVariant {
    /// Carousel image sources in DOM order, duplicates and all.
    pub images: Vec<String>,
    pub color_name: String,
    /// Computed swatch background: an `rgb(...)` colour or a `url(...)` pattern.
    pub swatch: String,
    pub color_type: String,
}

/// A colour variant after carousel normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub color_name: String,
    pub color_type: String,
    pub rgb_or_pattern: String,
    pub images: Vec<String>,
}

impl From<RawVariant> for Variant {
    fn from(raw: RawVariant) -> Self {
        let images = normalize_carousel_images(raw.images);
        Self {
            color_name: raw.color_name.trim().to_string(),
            color_type: raw.color_type.trim().to_lowercase(),
            rgb_or_pattern: raw.swatch,
            images,
        }
    }
}

impl Variant {
    #[must_use]
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Product-level fields scraped once from the base page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPage {
    pub title: Option<String>,
    pub price: Option<String>,
    pub sizes: Vec<String>,
    /// Images of the large editorial sections below the gallery.
    pub big_images: Vec<String>,
    pub material: Option<String>,
    pub best_for: Option<String>,
}

impl ProductPage {
    /// Title with surrounding whitespace removed; `None` when blank.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn meta(&self, fallback_title: &str) -> ProductMeta {
        ProductMeta {
            title: self.title().unwrap_or(fallback_title).to_string(),
            price: non_blank(self.price.as_deref()),
            sizes: self
                .sizes
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            material: non_blank(self.material.as_deref()),
            best_for: non_blank(self.best_for.as_deref()),
        }
    }
}

/// Product fields persisted at `collection/route`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMeta {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub sizes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_for: Option<String>,
}

/// Variant fields persisted at `collection/route/colors/{index}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRecord {
    pub imgs: Vec<String>,
    #[serde(rename = "colorName")]
    pub color_name: String,
    pub rgb: String,
    #[serde(rename = "type")]
    pub color_type: String,
    #[serde(rename = "sliderImg", skip_serializing_if = "Option::is_none")]
    pub slider_img: Option<String>,
}

impl VariantRecord {
    /// Pairs a variant's swatch metadata with the URLs its images were uploaded to.
    #[must_use]
    pub fn new(variant: &Variant, uploaded_urls: Vec<String>) -> Self {
        let slider_img = uploaded_urls.first().cloned();
        Self {
            imgs: uploaded_urls,
            color_name: variant.color_name.clone(),
            rgb: variant.rgb_or_pattern.clone(),
            color_type: variant.color_type.clone(),
            slider_img,
        }
    }
}

/// One staged file after it reached the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub local_name: String,
    pub remote_key: String,
    pub download_url: String,
}

/// Normalizes the gallery's image list.
///
/// Blank entries are dropped, duplicates removed keeping the first
/// occurrence, and the first entry moved to the end: the infinite carousel
/// clones the previous slide in front of the real first one.
#[must_use]
pub fn normalize_carousel_images(raw: Vec<String>) -> Vec<String> {
    let mut images = dedupe_urls(raw);
    if images.len() > 1 {
        images.rotate_left(1);
    }
    images
}

/// Trims URLs, drops blank ones and removes duplicates, keeping first-seen order.
#[must_use]
pub fn dedupe_urls(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
        .filter(|src| seen.insert(src.clone()))
        .collect()
}

/// Turns a product title into its database route.
///
/// `"Men's Tree Runners"` becomes `"mens-tree-runners"`. Characters the
/// database refuses in keys (`.` `$` `#` `[` `]` `/`) are dropped as well.
#[must_use]
pub fn route_from_title(title: &str) -> String {
    title
        .trim()
        .replace(['\'', '\u{2019}', '.', '$', '#', '[', ']', '/'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Derives a route from the last path segment of a product URL.
///
/// Returns `None` when the URL has no path segment beyond the host.
#[must_use]
pub fn route_from_url(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);
    let (_host, path) = path.split_once('/')?;
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(route_from_title)
        .filter(|route| !route.is_empty())
}

/// Extracts the colour slug from a swatch button's accessible label.
///
/// `"Select color Natural White (Cream Sole)"` yields `"natural-white"`.
#[must_use]
pub fn parse_swatch_label(label: &str) -> Option<String> {
    let name = SWATCH_LABEL_RE.captures(label)?.get(1)?.as_str();
    let slug = name.split_whitespace().collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_lowercase())
    }
}

/// Parses every label and removes duplicate slugs, keeping first-seen order.
#[must_use]
pub fn parse_swatch_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .filter_map(|label| parse_swatch_label(label.as_ref()))
        .filter(|slug| seen.insert(slug.clone()))
        .collect()
}

/// Reduces a page-supplied slug to `[a-z0-9-]` for use as a staging file
/// stem. Returns `fallback` when nothing usable is left.
///
/// `"black/white"` becomes `"black-white"`; `"../../x"` becomes `"x"`.
#[must_use]
pub fn safe_file_stem(raw: &str, fallback: &str) -> String {
    let mut stem = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            stem.push(c);
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        fallback.to_string()
    } else {
        stem.to_string()
    }
}

/// Forces an explicit scheme onto a media URL.
///
/// Gallery sources are usually protocol-relative (`//cdn.example.com/a.png`).
#[must_use]
pub fn with_explicit_scheme(url: &str) -> String {
    let url = url.trim();
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

/// Infers a lowercase file extension from the URL path, or returns `fallback`.
#[must_use]
pub fn infer_extension(url: &str, fallback: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);
    let Some((_, path)) = path.split_once('/') else {
        return fallback.to_string();
    };
    path.rsplit('/')
        .next()
        .and_then(|file_name| file_name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| EXTENSION_RE.is_match(ext))
        .map_or_else(|| fallback.to_string(), str::to_lowercase)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
