//! Data model of the product catalog: the persisted [`product::Product`]
//! record and the request-side [`product::ProductInput`].

pub mod errors;
pub mod product;

pub use product::{parse_id, Price, Product, ProductId, ProductInput, ValidProductInput};
