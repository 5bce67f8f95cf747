use axum::{
    async_trait,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use models::{Price, ProductInput};
use service::storage::UploadedFile;

use crate::errors::ApiError;

/// Multipart field carrying the product image.
pub const IMAGE_FIELD: &str = "image";

/// Body of a create/update request.
///
/// Accepts `multipart/form-data` (text fields plus an optional `image` file),
/// a JSON object, or a url-encoded form. A request without a `Content-Type`
/// decodes to empty input and fails validation later. Decoding errors keep
/// their own status, so an oversized upload is a 413.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub input: ProductInput,
    pub upload: Option<UploadedFile>,
}

enum BodyKind {
    Empty,
    Json,
    UrlEncoded,
    Multipart,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase());
    match content_type.as_deref() {
        None => BodyKind::Empty,
        Some(ct) if ct.starts_with("application/json") => BodyKind::Json,
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => BodyKind::UrlEncoded,
        Some(_) => BodyKind::Multipart,
    }
}

#[async_trait]
impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Empty => Ok(Self::default()),
            BodyKind::Json => {
                let Json(input) = Json::<ProductInput>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                Ok(Self { input, upload: None })
            }
            BodyKind::UrlEncoded => {
                let Form(input) = Form::<ProductInput>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                Ok(Self { input, upload: None })
            }
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                read_multipart(multipart).await
            }
        }
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::new(e.status(), e.body_text())
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // an empty file input still sends the part, just without a file name
            if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                form.upload = Some(UploadedFile::new(file_name, bytes.to_vec()));
            }
            continue;
        }

        let slot = match name.as_str() {
            "name" => &mut form.input.name,
            "category" => &mut form.input.category,
            "price" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.input.price = Some(Price::Text(text));
                continue;
            }
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }
    Ok(form)
}
