use std::sync::Arc;

use models::{Product, ProductId, ProductInput};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::products::id::IdGenerator;
use crate::storage::{BlobStore, ProductStore, UploadedFile};

/// Application service for the product catalog.
///
/// Each operation loads the whole collection, transforms it in memory and,
/// for mutations, saves it back. Mutations hold `write_lock` across that
/// cycle so concurrent requests within this process do not lose updates.
/// Writers in other processes sharing the same document are not coordinated.
pub struct ProductService<S: ProductStore, B: BlobStore> {
    store: Arc<S>,
    blobs: Arc<B>,
    ids: IdGenerator,
    write_lock: Mutex<()>,
}

impl<S: ProductStore, B: BlobStore> ProductService<S, B> {
    pub fn new(store: Arc<S>, blobs: Arc<B>) -> Self {
        Self { store, blobs, ids: IdGenerator::new(), write_lock: Mutex::new(()) }
    }

    /// Validate, load, store the optional image, then append a new product.
    ///
    /// An invalid input or an unreadable document writes nothing. If the
    /// image was stored but the document save fails, the image is left behind.
    #[instrument(skip_all, fields(upload = upload.is_some()))]
    pub async fn create(&self, input: ProductInput, upload: Option<UploadedFile>) -> Result<Product, ServiceError> {
        let valid = input.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut products = self.store.load().await?;
        let floor = products.iter().map(|p| p.id).max();
        let id = self.ids.next_above(floor)?;
        let image = self.store_upload(upload.as_ref()).await?;
        let product = Product::new(id, valid, image);
        products.push(product.clone());
        self.persist(&products, product.image.as_deref()).await?;

        info!(id = product.id, name = %product.name, "product created");
        Ok(product)
    }

    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        self.store.load().await
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::not_found("product"))
    }

    /// Replace name, category and price of an existing product in place.
    /// The image changes only when a new file is uploaded.
    #[instrument(skip(self, input, upload), fields(upload = upload.is_some()))]
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput,
        upload: Option<UploadedFile>,
    ) -> Result<Product, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.store.load().await?;
        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ServiceError::not_found("product"))?;

        let valid = input.validate()?;
        let image = self.store_upload(upload.as_ref()).await?;
        let new_blob = image.clone();

        products[index].apply(valid, image);
        let updated = products[index].clone();
        self.persist(&products, new_blob.as_deref()).await?;

        info!(id, "product updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        let products = self.store.load().await?;
        let before = products.len();
        let remaining: Vec<Product> = products.into_iter().filter(|p| p.id != id).collect();
        if remaining.len() == before {
            return Err(ServiceError::not_found("product"));
        }
        self.store.save(&remaining).await?;

        info!(id, "product deleted");
        Ok(())
    }

    async fn store_upload(&self, upload: Option<&UploadedFile>) -> Result<Option<String>, ServiceError> {
        match upload {
            Some(file) => self.blobs.put(file).await.map(Some),
            None => Ok(None),
        }
    }

    async fn persist(&self, products: &[Product], new_blob: Option<&str>) -> Result<(), ServiceError> {
        if let Err(e) = self.store.save(products).await {
            if let Some(blob) = new_blob {
                warn!(%blob, error = %e, "product save failed; uploaded image is orphaned");
            }
            return Err(e);
        }
        Ok(())
    }
}
