//! Staging and upload of product media.
//!
//! Media moves through a local staging directory: [`AssetPipeline::download_all`]
//! writes fetched bytes there, [`AssetPipeline::upload_all`] pushes every staged
//! file to the blob store and removes it once its download URL is known.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use swatch_core::{infer_extension, with_explicit_scheme, UploadedAsset};
use swatch_store::{content_type_for, BlobStore};

use crate::error::ScraperError;
use crate::fetch::AssetFetcher;

pub struct AssetPipeline<B> {
    fetcher: AssetFetcher,
    store: B,
}

impl<B: BlobStore + Sync> AssetPipeline<B> {
    pub fn new(fetcher: AssetFetcher, store: B) -> Self {
        Self { fetcher, store }
    }

    /// Hands the blob store back, e.g. to close it at shutdown.
    pub fn into_store(self) -> B {
        self.store
    }

    /// Fetches every URL into `staging_dir` and returns the stems of the files
    /// that were written, in URL order.
    ///
    /// Files are named `{prefix}.{ext}` for a single URL and `{prefix}-{i}.{ext}`
    /// otherwise, `i` being the URL's position in `urls`. `fallback_ext` is used
    /// when the URL path carries no usable extension. A URL that cannot be
    /// fetched or written is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidFilePrefix`] if `prefix` could name a
    /// path outside `staging_dir`, or [`ScraperError::Io`] if `staging_dir`
    /// cannot be created.
    pub async fn download_all(
        &self,
        prefix: &str,
        urls: &[String],
        staging_dir: &Path,
        fallback_ext: &str,
    ) -> Result<Vec<String>, ScraperError> {
        if prefix.is_empty() || prefix.contains(['/', '\\']) || prefix.contains("..") {
            return Err(ScraperError::InvalidFilePrefix {
                prefix: prefix.to_owned(),
            });
        }
        tokio::fs::create_dir_all(staging_dir)
            .await
            .map_err(|e| ScraperError::io(staging_dir, e))?;

        let mut stems = Vec::with_capacity(urls.len());
        for (i, raw_url) in urls.iter().enumerate() {
            let stem = if urls.len() > 1 {
                format!("{prefix}-{i}")
            } else {
                prefix.to_owned()
            };
            let url = with_explicit_scheme(raw_url);
            let ext = infer_extension(&url, fallback_ext);
            let path = staging_dir.join(format!("{stem}.{ext}"));

            match self.stage(&url, &path).await {
                Ok(()) => stems.push(stem),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "media download failed; skipping");
                }
            }
        }
        Ok(stems)
    }

    async fn stage(&self, url: &str, path: &Path) -> Result<(), ScraperError> {
        let bytes = self.fetcher.fetch(url).await?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| ScraperError::io(path, e))
    }

    /// Uploads every file in `staging_dir` to `{remote_prefix}/{file name}`.
    ///
    /// Uploads run concurrently. Each local file is deleted once its download
    /// URL is confirmed. Returns a map from file stem to download URL, or
    /// `None` when the directory is missing or empty.
    ///
    /// # Errors
    ///
    /// Any single failed read, upload or delete fails the whole call; uploads
    /// still in flight at that point are dropped.
    pub async fn upload_all(
        &self,
        staging_dir: &Path,
        remote_prefix: &str,
    ) -> Result<Option<BTreeMap<String, String>>, ScraperError> {
        let files = staged_files(staging_dir).await?;
        if files.is_empty() {
            return Ok(None);
        }

        let remote_prefix = remote_prefix.trim_end_matches('/');
        let uploads = files
            .into_iter()
            .map(|(file_name, path)| self.upload_one(remote_prefix, file_name, path));
        let uploaded = try_join_all(uploads).await?;

        Ok(Some(
            uploaded
                .into_iter()
                .map(|asset| (asset.local_name, asset.download_url))
                .collect(),
        ))
    }

    async fn upload_one(
        &self,
        remote_prefix: &str,
        file_name: String,
        path: PathBuf,
    ) -> Result<UploadedAsset, ScraperError> {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ScraperError::io(&path, e))?;
        let remote_key = format!("{remote_prefix}/{file_name}");
        let download_url = self
            .store
            .upload(&remote_key, bytes, content_type_for(&file_name))
            .await?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| ScraperError::io(&path, e))?;

        let local_name = Path::new(&file_name)
            .file_stem()
            .map_or_else(|| file_name.clone(), |s| s.to_string_lossy().into_owned());
        tracing::debug!(remote_key = %remote_key, "staged file uploaded");
        Ok(UploadedAsset {
            local_name,
            remote_key,
            download_url,
        })
    }

    /// Removes every file left in `staging_dir`. A missing directory is fine.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the directory cannot be listed or a
    /// file cannot be removed.
    pub async fn clear_staging(&self, staging_dir: &Path) -> Result<(), ScraperError> {
        for (_, path) in staged_files(staging_dir).await? {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| ScraperError::io(&path, e))?;
        }
        Ok(())
    }
}

/// Regular files in `dir`, sorted by name. Empty when `dir` does not exist.
async fn staged_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, ScraperError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ScraperError::io(dir, e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ScraperError::io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| ScraperError::io(entry.path(), e))?;
        if file_type.is_file() {
            files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    files.sort();
    Ok(files)
}
