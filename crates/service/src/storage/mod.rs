//! Storage abstractions for the service layer
//!
//! The product collection is only ever read and written as a whole; uploaded
//! images are kept apart from it and referenced by path.

use async_trait::async_trait;
use models::Product;

use crate::errors::ServiceError;

pub mod blob;
pub mod json_file_store;

pub use blob::{BlobStore, DiskBlobStore, UploadedFile};
pub use json_file_store::JsonFileStore;

/// Whole-collection persistence of products.
///
/// There is no locking at this level: callers that load, mutate and save
/// must serialize that cycle themselves.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// The stored collection in insertion order, empty if nothing was stored yet.
    async fn load(&self) -> Result<Vec<Product>, ServiceError>;
    /// Replace the stored collection with `products`.
    async fn save(&self, products: &[Product]) -> Result<(), ServiceError>;
}
