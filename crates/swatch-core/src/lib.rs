//! Shared domain model and configuration for the swatch harvester.

mod app_config;
mod config;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    dedupe_urls, infer_extension, normalize_carousel_images, parse_swatch_label, parse_swatch_labels,
    route_from_title, route_from_url, safe_file_stem, with_explicit_scheme, ProductMeta,
    ProductPage, RawVariant, UploadedAsset, Variant, VariantRecord,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
