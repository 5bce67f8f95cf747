use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use models::Product;
use tokio::fs;
use tracing::debug;

use crate::errors::ServiceError;
use crate::storage::ProductStore;

/// JSON file-backed product collection.
///
/// The whole collection is one pretty-printed JSON array. Saves go through a
/// sibling `*.tmp` file that is renamed over the document, so a reader never
/// observes a half-written file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Initialize the store from a path. Creates the file with an empty array if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::storage(format!("create {}: {e}", parent.display())))?;
        }

        let store = Self { file_path };
        if fs::metadata(&store.file_path).await.is_err() {
            store.save(&[]).await?;
        }
        Ok(Arc::new(store))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.file_path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ProductStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Product>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ServiceError::storage(format!("read {}: {e}", self.file_path.display())))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::storage(format!("malformed {}: {e}", self.file_path.display())))
    }

    async fn save(&self, products: &[Product]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(products)
            .map_err(|e| ServiceError::storage(format!("serialize products: {e}")))?;
        let tmp = self.tmp_path();
        fs::write(&tmp, data)
            .await
            .map_err(|e| ServiceError::storage(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::storage(format!("replace {}: {e}", self.file_path.display())))?;
        debug!(path = %self.file_path.display(), count = products.len(), "product document saved");
        Ok(())
    }
}
