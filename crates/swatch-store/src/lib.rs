//! Persistence for harvested products: a blob store for media and a
//! hierarchical database for records.

pub mod blob;
pub mod database;
pub mod error;
pub mod records;

pub use blob::{content_type_for, BlobStore, FirebaseStorage};
pub use database::{FirebaseDatabase, HierarchicalStore};
pub use error::StoreError;
pub use records::RecordWriter;
