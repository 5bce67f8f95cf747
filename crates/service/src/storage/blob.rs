use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::info;

use crate::errors::ServiceError;

/// An image received with a create or update request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as reported by the client.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { file_name: file_name.into(), bytes: bytes.into() }
    }
}

/// Storage for uploaded image bytes, separate from the product document.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist the file and return the reference to put in `Product::image`.
    async fn put(&self, file: &UploadedFile) -> Result<String, ServiceError>;
}

/// Writes uploads to a directory as `<millis>-<file name>`.
#[derive(Clone, Debug)]
pub struct DiskBlobStore {
    dir: PathBuf,
    public_prefix: String,
}

impl DiskBlobStore {
    /// `public_prefix` is the URL path the directory is served under, e.g. `/uploads`.
    pub async fn new<P: Into<PathBuf>>(dir: P, public_prefix: &str) -> Result<Arc<Self>, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::storage(format!("create {}: {e}", dir.display())))?;
        Ok(Arc::new(Self {
            dir,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }))
    }
}

/// Keep only the last path component of a client supplied name.
fn base_name(original: &str) -> &str {
    let base = original.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("").trim();
    match base {
        "" | "." | ".." => "upload",
        other => other,
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn put(&self, file: &UploadedFile) -> Result<String, ServiceError> {
        let stored = format!("{}-{}", Utc::now().timestamp_millis(), base_name(&file.file_name));
        let target = self.dir.join(&stored);
        fs::write(&target, &file.bytes)
            .await
            .map_err(|e| ServiceError::storage(format!("write {}: {e}", target.display())))?;
        info!(file = %stored, size = file.bytes.len(), "stored upload");
        Ok(format!("{}/{}", self.public_prefix, stored))
    }
}
