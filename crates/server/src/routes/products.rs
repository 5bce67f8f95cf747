use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::types::Message;
use models::{parse_id, Product, ProductId};
use serde::Serialize;
use tracing::info;

use crate::{errors::ApiError, extract::ProductForm, state::ServerState};

/// Reply of create and update: a confirmation plus the stored product.
#[derive(Debug, Serialize)]
pub struct ProductReply {
    pub message: &'static str,
    pub product: Product,
}

/// Non-numeric ids cannot match any product.
fn product_id(raw: &str) -> Result<ProductId, ApiError> {
    parse_id(raw).ok_or_else(ApiError::not_found)
}

pub async fn list_products(State(state): State<ServerState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list().await?;
    info!(count = products.len(), "list products");
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<ServerState>,
    form: ProductForm,
) -> Result<(StatusCode, Json<ProductReply>), ApiError> {
    let product = state.products.create(form.input, form.upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductReply { message: "Product added successfully", product }),
    ))
}

pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = product_id(&id)?;
    Ok(Json(state.products.get(id).await?))
}

pub async fn update_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    form: ProductForm,
) -> Result<Json<ProductReply>, ApiError> {
    let id = product_id(&id)?;
    let product = state.products.update(id, form.input, form.upload).await?;
    Ok(Json(ProductReply { message: "Product updated successfully", product }))
}

pub async fn delete_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let id = product_id(&id)?;
    state.products.delete(id).await?;
    Ok(Json(Message::new("Product deleted successfully")))
}
