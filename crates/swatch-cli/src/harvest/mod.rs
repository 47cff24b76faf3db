//! The `harvest` command.
//!
//! Products are harvested one after another on a single browser page. A
//! failure aborts only the product it happened in; the run fails as a whole
//! only when no product could be harvested.

mod product;
#[cfg(test)]
mod test_support;
mod walker;

use std::path::PathBuf;

use swatch_core::AppConfig;
use swatch_scraper::{AssetPipeline, PageExtractor};
use swatch_store::{BlobStore, HierarchicalStore, RecordWriter};

pub(crate) use walker::WalkSummary;

/// Local staging directories, one per media kind so batches never mix.
#[derive(Debug, Clone)]
pub(crate) struct StagingDirs {
    pub images: PathBuf,
    pub big: PathBuf,
    pub video: PathBuf,
}

impl StagingDirs {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self {
            images: config.image_staging_dir(),
            big: config.big_image_staging_dir(),
            video: config.video_staging_dir(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RunTotals {
    pub products: usize,
    pub failed_products: usize,
    pub variants: WalkSummary,
}

pub(crate) struct Harvester<P, B, S> {
    page: P,
    assets: AssetPipeline<B>,
    records: RecordWriter<S>,
    staging: StagingDirs,
    media_root: String,
}

impl<P, B, S> Harvester<P, B, S>
where
    P: PageExtractor,
    B: BlobStore + Sync,
    S: HierarchicalStore,
{
    pub(crate) fn new(
        page: P,
        assets: AssetPipeline<B>,
        records: RecordWriter<S>,
        staging: StagingDirs,
        media_root: &str,
    ) -> Self {
        Self {
            page,
            assets,
            records,
            staging,
            media_root: media_root.trim_matches('/').to_owned(),
        }
    }

    /// Harvests every URL in turn, isolating per-product failures.
    pub(crate) async fn run(&mut self, urls: &[String]) -> RunTotals {
        let mut totals = RunTotals::default();
        for url in urls {
            totals.products += 1;
            match self.harvest_product(url).await {
                Ok(summary) => {
                    println!(
                        "{url}: recorded {} of {} variants ({} without images, {} failed)",
                        summary.recorded,
                        summary.discovered,
                        summary.skipped_empty,
                        summary.failed
                    );
                    totals.variants.absorb(summary);
                }
                Err(e) => {
                    totals.failed_products += 1;
                    tracing::error!(
                        url = %url,
                        error = %e,
                        cause = %e.root_cause(),
                        "product harvest failed"
                    );
                    eprintln!("error: failed to harvest {url}: {e:#}");
                }
            }
        }
        totals
    }

    /// Returns the page and the store handles so they can be closed.
    pub(crate) fn into_parts(self) -> (P, B, S) {
        (
            self.page,
            self.assets.into_store(),
            self.records.into_store(),
        )
    }
}

#[cfg(test)]
#[path = "harvest_test.rs"]
mod tests;
