//! One product: base page fields, editorial images, video, then the
//! variant walk.

use anyhow::Context;
use swatch_core::{dedupe_urls, route_from_title, route_from_url};
use swatch_scraper::PageExtractor;
use swatch_store::{BlobStore, HierarchicalStore};

use super::walker::{VariantWalker, WalkSummary};
use super::Harvester;

impl<P, B, S> Harvester<P, B, S>
where
    P: PageExtractor,
    B: BlobStore + Sync,
    S: HierarchicalStore,
{
    /// # Errors
    ///
    /// Fails if the page cannot be loaded or read, if it has neither a title
    /// nor variant images, or if the product fields cannot be written.
    /// Per-variant and per-media failures are logged, not returned.
    pub(super) async fn harvest_product(&mut self, url: &str) -> anyhow::Result<WalkSummary> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("failed to load {url}"))?;
        match self.page.dismiss_modal().await {
            Ok(true) => tracing::debug!(url = %url, "entry modal dismissed"),
            Ok(false) => {}
            Err(e) => tracing::warn!(url = %url, error = %e, "could not dismiss entry modal"),
        }

        let product = self
            .page
            .extract_product()
            .await
            .context("failed to read product fields")?;
        let identifiers = self
            .page
            .list_color_variant_identifiers()
            .await
            .context("failed to list colour variants")?;

        if product.title().is_none() {
            let first = self
                .page
                .extract_current_variant()
                .await
                .context("failed to read the first variant")?;
            if !first.has_images() {
                anyhow::bail!("{url} has neither a product title nor variant images");
            }
        }

        let Some(route) = product
            .title()
            .map(route_from_title)
            .filter(|route| !route.is_empty())
            .or_else(|| route_from_url(url))
        else {
            anyhow::bail!("could not derive a record route for {url}");
        };

        self.records
            .write_product_meta(&route, &product.meta(&route))
            .await
            .with_context(|| format!("failed to write product fields for {route}"))?;
        tracing::info!(route = %route, variants = identifiers.len(), "product discovered");

        self.harvest_big_images(&route, product.big_images.clone()).await;
        self.harvest_video(&route).await;

        let media_prefix = format!("{}/{route}", self.media_root);
        let base_url = url.trim_end_matches('/');
        let summary = VariantWalker {
            page: &mut self.page,
            assets: &self.assets,
            records: &self.records,
            staging_dir: &self.staging.images,
            media_prefix,
            route: &route,
        }
        .walk(base_url, &identifiers)
        .await;

        Ok(summary)
    }

    async fn harvest_big_images(&self, route: &str, raw: Vec<String>) {
        let urls = dedupe_urls(raw);
        if urls.is_empty() {
            return;
        }
        match self.stage_and_upload(Media::Big, &urls, route).await {
            Ok(Some(uploaded)) => {
                if let Err(e) = self.records.write_big_images(route, &uploaded).await {
                    tracing::warn!(route, error = %e, "could not record big images");
                }
            }
            Ok(None) => tracing::warn!(route, "no big images could be staged"),
            Err(e) => tracing::warn!(route, error = %e, cause = %e.root_cause(), "big images skipped"),
        }
    }

    async fn harvest_video(&mut self, route: &str) {
        let src = match self.page.probe_video().await {
            Ok(Some(src)) => src,
            Ok(None) => {
                tracing::debug!(route, "no product video");
                return;
            }
            Err(e) => {
                tracing::warn!(route, error = %e, "video probe failed");
                return;
            }
        };
        match self.stage_and_upload(Media::Video, &[src], route).await {
            Ok(Some(uploaded)) => {
                let Some(video_url) = uploaded.first() else {
                    return;
                };
                if let Err(e) = self.records.write_video(route, video_url).await {
                    tracing::warn!(route, error = %e, "could not record video");
                }
            }
            Ok(None) => tracing::warn!(route, "product video could not be staged"),
            Err(e) => tracing::warn!(route, error = %e, cause = %e.root_cause(), "video skipped"),
        }
    }

    /// Downloads `urls` into the media kind's staging directory and uploads
    /// them, returning the download URLs in input order.
    async fn stage_and_upload(
        &self,
        media: Media,
        urls: &[String],
        route: &str,
    ) -> anyhow::Result<Option<Vec<String>>> {
        let (dir, prefix, fallback_ext) = match media {
            Media::Big => (&self.staging.big, "big", "jpg"),
            Media::Video => (&self.staging.video, "video", "mp4"),
        };
        self.assets.clear_staging(dir).await?;
        let stems = self
            .assets
            .download_all(prefix, urls, dir, fallback_ext)
            .await?;
        let remote_prefix = format!("{}/{route}/{prefix}", self.media_root);
        let Some(uploaded) = self.assets.upload_all(dir, &remote_prefix).await? else {
            return Ok(None);
        };
        Ok(Some(
            stems
                .iter()
                .filter_map(|stem| uploaded.get(stem).cloned())
                .collect(),
        ))
    }
}

#[derive(Debug, Clone, Copy)]
enum Media {
    Big,
    Video,
}
