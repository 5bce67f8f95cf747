//! Service layer of the product catalog.
//! - `storage`: whole-document product persistence and the upload blob store.
//! - `products`: the CRUD operations composed from those stores.

pub mod errors;
pub mod storage;
pub mod products;
