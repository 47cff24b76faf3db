pub mod assets;
pub mod error;
pub mod fetch;
pub mod page;
mod retry;

pub use assets::AssetPipeline;
pub use error::ScraperError;
pub use fetch::AssetFetcher;
pub use page::{PageExtractor, WebDriverPage};
