//! Product CRUD on top of [`crate::storage`].

pub mod id;
pub mod service;

pub use id::IdGenerator;
pub use service::ProductService;
