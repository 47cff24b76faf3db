//! Per-variant walk over one product.
//!
//! For each discovered colour the walker extracts whatever the page renders,
//! stages and uploads its images, and writes the record at the next
//! confirmed-success index. It then navigates to the next colour whatever
//! happened, so a failing variant never stops the walk and recorded indices
//! stay contiguous from 0.

use std::fmt;
use std::path::Path;

use swatch_core::{safe_file_stem, VariantRecord};
use swatch_scraper::{AssetPipeline, PageExtractor};
use swatch_store::{BlobStore, HierarchicalStore, RecordWriter};

/// Where the walk stands. `raw` moves over every discovered identifier,
/// `confirmed` only past variants whose record was written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WalkCursor {
    pub raw: usize,
    pub confirmed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WalkSummary {
    pub discovered: usize,
    pub recorded: usize,
    pub skipped_empty: usize,
    pub failed: usize,
}

impl WalkSummary {
    pub(crate) fn absorb(&mut self, other: WalkSummary) {
        self.discovered += other.discovered;
        self.recorded += other.recorded;
        self.skipped_empty += other.skipped_empty;
        self.failed += other.failed;
    }
}

/// Step of the per-variant pipeline a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Navigating,
    Extracting,
    Downloading,
    Uploading,
    Recording,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Navigating => "navigating",
            Stage::Extracting => "extracting",
            Stage::Downloading => "downloading",
            Stage::Uploading => "uploading",
            Stage::Recording => "recording",
        })
    }
}

#[derive(Debug)]
pub(crate) struct StageFailure {
    pub stage: Stage,
    pub error: anyhow::Error,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, StageFailure>;
}

impl<T, E: Into<anyhow::Error>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, StageFailure> {
        self.map_err(|e| StageFailure {
            stage,
            error: e.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariantOutcome {
    Recorded,
    NoImages,
}

pub(crate) struct VariantWalker<'a, P, B, S> {
    pub page: &'a mut P,
    pub assets: &'a AssetPipeline<B>,
    pub records: &'a RecordWriter<S>,
    pub staging_dir: &'a Path,
    /// Remote folder for this product's media, `{media_root}/{route}`.
    pub media_prefix: String,
    pub route: &'a str,
}

impl<P, B, S> VariantWalker<'_, P, B, S>
where
    P: PageExtractor,
    B: BlobStore + Sync,
    S: HierarchicalStore,
{
    /// Walks `identifiers` starting from the variant already on screen.
    /// Variant `i + 1` lives at `{base_url}-{identifiers[i + 1]}`.
    pub(crate) async fn walk(&mut self, base_url: &str, identifiers: &[String]) -> WalkSummary {
        let mut cursor = WalkCursor::default();
        let mut summary = WalkSummary {
            discovered: identifiers.len(),
            ..WalkSummary::default()
        };
        let mut on_page = true;

        while let Some(identifier) = identifiers.get(cursor.raw) {
            if on_page {
                match self.record_current(identifier, cursor.confirmed).await {
                    Ok(VariantOutcome::Recorded) => {
                        cursor.confirmed += 1;
                        summary.recorded += 1;
                    }
                    Ok(VariantOutcome::NoImages) => {
                        summary.skipped_empty += 1;
                        tracing::info!(route = %self.route, variant = %identifier, "variant has no images; skipped");
                    }
                    Err(failure) => {
                        summary.failed += 1;
                        tracing::error!(
                            route = %self.route,
                            variant = %identifier,
                            stage = %failure.stage,
                            error = %failure.error,
                            cause = %failure.error.root_cause(),
                            "variant failed"
                        );
                    }
                }
            } else {
                summary.failed += 1;
                tracing::error!(
                    route = %self.route,
                    variant = %identifier,
                    stage = %Stage::Navigating,
                    "variant page did not load; not extracted"
                );
            }

            if let Some(next) = identifiers.get(cursor.raw + 1) {
                let next_url = format!("{base_url}-{next}");
                on_page = match self.page.goto(&next_url).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(url = %next_url, error = %e, "navigation failed");
                        false
                    }
                };
            }
            cursor.raw += 1;
        }

        summary
    }

    async fn record_current(
        &mut self,
        identifier: &str,
        index: usize,
    ) -> Result<VariantOutcome, StageFailure> {
        let variant = self
            .page
            .extract_current_variant()
            .await
            .at(Stage::Extracting)?;
        if !variant.has_images() {
            return Ok(VariantOutcome::NoImages);
        }

        self.assets
            .clear_staging(self.staging_dir)
            .await
            .at(Stage::Downloading)?;
        let stem = safe_file_stem(identifier, "img");
        let stems = self
            .assets
            .download_all(&stem, &variant.images, self.staging_dir, "png")
            .await
            .at(Stage::Downloading)?;

        let folder = if variant.color_name.is_empty() {
            identifier
        } else {
            variant.color_name.as_str()
        };
        let uploaded = self
            .assets
            .upload_all(self.staging_dir, &format!("{}/{folder}", self.media_prefix))
            .await
            .at(Stage::Uploading)?
            .ok_or_else(|| anyhow::anyhow!("none of {} images could be staged", variant.images.len()))
            .at(Stage::Downloading)?;

        let urls: Vec<String> = stems
            .iter()
            .filter_map(|stem| uploaded.get(stem).cloned())
            .collect();
        let record = VariantRecord::new(&variant, urls);
        self.records
            .write_variant(self.route, index, &record)
            .await
            .at(Stage::Recording)?;

        tracing::info!(
            route = %self.route,
            variant = %identifier,
            index,
            images = record.imgs.len(),
            "variant recorded"
        );
        Ok(VariantOutcome::Recorded)
    }
}

#[cfg(test)]
#[path = "walker_test.rs"]
mod tests;
