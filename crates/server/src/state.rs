use std::sync::Arc;

use service::{
    products::ProductService,
    storage::{DiskBlobStore, JsonFileStore},
};

/// Product service wired to the on-disk document and upload directory.
pub type CatalogService = ProductService<JsonFileStore, DiskBlobStore>;

#[derive(Clone)]
pub struct ServerState {
    pub products: Arc<CatalogService>,
}
