use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    /// The product document or the upload area cannot be read, parsed or written.
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("validation error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn storage(detail: impl Into<String>) -> Self { Self::Storage(detail.into()) }
}
