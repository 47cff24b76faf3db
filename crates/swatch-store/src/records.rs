//! Maps harvested product data onto the record tree:
//!
//! ```text
//! {collection}/{route}/{title,price,sizes,material,bestFor,bigImgs,video}
//! {collection}/{route}/colors/{index}/{imgs,colorName,rgb,type,sliderImg}
//! ```
//!
//! Every write is an additive `update` at its path. There is no transaction
//! across writes: a crash between two of them leaves a partially populated
//! record.

use serde::Serialize;
use serde_json::{Map, Value};
use swatch_core::{ProductMeta, VariantRecord};

use crate::database::HierarchicalStore;
use crate::error::StoreError;

/// Writes product records for one collection.
pub struct RecordWriter<S> {
    store: S,
    collection: String,
}

impl<S: HierarchicalStore> RecordWriter<S> {
    pub fn new(store: S, collection: &str) -> Self {
        Self {
            store,
            collection: collection.trim_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Hands the store back, e.g. to close it at shutdown.
    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub fn product_path(&self, route: &str) -> String {
        format!("{}/{route}", self.collection)
    }

    #[must_use]
    pub fn variant_path(&self, route: &str, index: usize) -> String {
        format!("{}/{route}/colors/{index}", self.collection)
    }

    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the underlying store.
    pub async fn write_product_meta(&self, route: &str, meta: &ProductMeta) -> Result<(), StoreError> {
        let fields = to_fields("product meta", meta)?;
        self.store.update(&self.product_path(route), fields).await?;
        tracing::debug!(collection = %self.collection, route, "product meta written");
        Ok(())
    }

    /// Writes one variant at its confirmed-success `index`.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the underlying store.
    pub async fn write_variant(
        &self,
        route: &str,
        index: usize,
        record: &VariantRecord,
    ) -> Result<(), StoreError> {
        let fields = to_fields("variant record", record)?;
        self.store
            .update(&self.variant_path(route, index), fields)
            .await?;
        tracing::info!(collection = %self.collection, route, index, "variant record written");
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the underlying store.
    pub async fn write_big_images(&self, route: &str, urls: &[String]) -> Result<(), StoreError> {
        let mut fields = Map::new();
        fields.insert("bigImgs".to_owned(), Value::from(urls.to_vec()));
        self.store.update(&self.product_path(route), fields).await
    }

    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the underlying store.
    pub async fn write_video(&self, route: &str, url: &str) -> Result<(), StoreError> {
        let mut fields = Map::new();
        fields.insert("video".to_owned(), Value::from(url));
        self.store.update(&self.product_path(route), fields).await
    }
}

fn to_fields<T: Serialize>(context: &str, value: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::NotAnObject {
            context: context.to_owned(),
        }),
        Err(e) => Err(StoreError::Json {
            context: context.to_owned(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingStore {
        updates: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    impl HierarchicalStore for RecordingStore {
        async fn set(&self, _path: &str, _value: Value) -> Result<(), StoreError> {
            Ok(())
        }

        async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
            self.updates
                .lock()
                .unwrap()
                .push((path.to_owned(), fields));
            Ok(())
        }
    }

    #[test]
    fn paths_are_scoped_to_the_collection() {
        let writer = RecordWriter::new(RecordingStore::default(), "/shoes/");
        assert_eq!(writer.collection(), "shoes");
        assert_eq!(writer.product_path("tree-runner"), "shoes/tree-runner");
        assert_eq!(
            writer.variant_path("tree-runner", 2),
            "shoes/tree-runner/colors/2"
        );
    }

    #[tokio::test]
    async fn variant_is_one_merge_at_its_index() {
        let writer = RecordWriter::new(RecordingStore::default(), "shoes");
        let record = VariantRecord {
            imgs: vec!["https://dl/a".to_owned()],
            color_name: "Jet Black".to_owned(),
            rgb: "rgb(0, 0, 0)".to_owned(),
            color_type: "classic".to_owned(),
            slider_img: Some("https://dl/a".to_owned()),
        };
        writer.write_variant("tree-runner", 0, &record).await.unwrap();

        let store = writer.into_store();
        let updates = store.updates.into_inner().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "shoes/tree-runner/colors/0");
        assert_eq!(updates[0].1["colorName"], "Jet Black");
        assert_eq!(updates[0].1["imgs"], serde_json::json!(["https://dl/a"]));
    }

    #[tokio::test]
    async fn media_fields_merge_into_the_product() {
        let writer = RecordWriter::new(RecordingStore::default(), "shoes");
        writer
            .write_big_images("tree-runner", &["https://dl/big".to_owned()])
            .await
            .unwrap();
        writer
            .write_video("tree-runner", "https://dl/clip")
            .await
            .unwrap();

        let updates = writer.into_store().updates.into_inner().unwrap();
        assert_eq!(updates[0].0, "shoes/tree-runner");
        assert_eq!(updates[0].1["bigImgs"], serde_json::json!(["https://dl/big"]));
        assert_eq!(updates[1].1["video"], "https://dl/clip");
    }
}
