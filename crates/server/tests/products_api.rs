use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::StorageConfig;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes;
use server::startup::build_state;

const BOUNDARY: &str = "catalog-test-boundary";

struct TestApp {
    router: Router,
    root: PathBuf,
    storage: StorageConfig,
}

impl TestApp {
    async fn start() -> anyhow::Result<Self> {
        let root = std::env::temp_dir().join(format!("catalog_api_{}", Uuid::new_v4()));
        let storage = StorageConfig {
            data_file: root.join("data.json").to_string_lossy().into_owned(),
            upload_dir: root.join("uploads").to_string_lossy().into_owned(),
            public_prefix: "/uploads".into(),
            max_upload_bytes: 1024 * 1024,
        };
        let state = build_state(&storage).await?;
        let router = routes::build_router(state, tower_http::cors::CorsLayer::very_permissive(), &storage);
        Ok(Self { router, root, storage })
    }

    async fn send(&self, req: Request<Body>) -> anyhow::Result<(StatusCode, Vec<u8>)> {
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        Ok((status, bytes.to_vec()))
    }

    async fn send_json(&self, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
        let (status, bytes) = self.send(req).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, body))
    }

    async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.root).await;
    }
}

fn multipart(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(method: &str, uri: &str, body: Vec<u8>) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))?)
}

fn empty_request(method: &str, uri: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder().method(method).uri(uri).body(Body::empty())?)
}

const PEN: &[(&str, &str)] = &[("name", "Pen"), ("category", "Stationery"), ("price", "1.50")];

#[tokio::test]
async fn pen_scenario_create_get_delete() -> anyhow::Result<()> {
    let app = TestApp::start().await?;

    let (status, body) = app
        .send_json(multipart_request("POST", "/api/products", multipart(PEN, None))?)
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product added successfully");
    let product = body["product"].clone();
    let id = product["id"].as_i64().expect("numeric id");
    assert_eq!(
        product,
        json!({"id": id, "name": "Pen", "category": "Stationery", "price": "1.50", "image": null})
    );

    let (status, fetched) = app.send_json(empty_request("GET", &format!("/api/products/{id}"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, product);

    let (status, body) = app.send_json(empty_request("DELETE", &format!("/api/products/{id}"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Product deleted successfully"}));

    let (status, body) = app.send_json(empty_request("GET", &format!("/api/products/{id}"))?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Product not found"}));

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn list_returns_products_in_creation_order() -> anyhow::Result<()> {
    let app = TestApp::start().await?;

    let (status, body) = app.send_json(empty_request("GET", "/api/products")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    for name in ["A", "B", "C"] {
        let fields = [("name", name), ("category", "c"), ("price", "1")];
        let (status, _) = app
            .send_json(multipart_request("POST", "/api/products", multipart(&fields, None))?)
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, first) = app.send_json(empty_request("GET", "/api/products")?).await?;
    let (_, second) = app.send_json(empty_request("GET", "/api/products")?).await?;
    assert_eq!(first, second);
    let names: Vec<_> = first.as_array().unwrap().iter().map(|p| p["name"].clone()).collect();
    assert_eq!(names, vec![json!("A"), json!("B"), json!("C")]);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_rejected_without_writing() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let before = tokio::fs::read(&app.storage.data_file).await?;

    let fields = [("name", "Pen"), ("category", "Stationery")];
    let (status, body) = app
        .send_json(multipart_request("POST", "/api/products", multipart(&fields, Some(("p.png", &b"png"[..]))))?)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "price is required");

    let (status, body) = app.send_json(empty_request("POST", "/api/products")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");

    assert_eq!(tokio::fs::read(&app.storage.data_file).await?, before);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn json_bodies_are_accepted() -> anyhow::Result<()> {
    let app = TestApp::start().await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"name": "Mug", "category": "Kitchen", "price": 12.5}))?))?;
    let (status, body) = app.send_json(req).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["price"], json!(12.5));

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn urlencoded_forms_are_accepted() -> anyhow::Result<()> {
    let app = TestApp::start().await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("name=Pen&category=Stationery&price=1.50"))?;
    let (status, body) = app.send_json(req).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["name"], "Pen");
    assert_eq!(body["product"]["price"], json!("1.50"));

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn body_without_content_type_is_empty_input() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let before = tokio::fs::read(&app.storage.data_file).await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/products")
        .body(Body::from(r#"{"name": "Pen", "category": "Stationery", "price": "1.50"}"#))?;
    let (status, body) = app.send_json(req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");
    assert_eq!(tokio::fs::read(&app.storage.data_file).await?, before);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let before = tokio::fs::read(&app.storage.data_file).await?;

    let big = vec![0u8; 2 * app.storage.max_upload_bytes];
    let (status, _) = app
        .send(multipart_request("POST", "/api/products", multipart(PEN, Some(("big.png", &big[..]))))?)
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(tokio::fs::read(&app.storage.data_file).await?, before);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn update_keeps_image_unless_new_file_uploaded() -> anyhow::Result<()> {
    let app = TestApp::start().await?;

    let (status, body) = app
        .send_json(multipart_request("POST", "/api/products", multipart(PEN, Some(("pen.png", &b"first"[..]))))?)
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["product"]["id"].as_i64().unwrap();
    let image = body["product"]["image"].as_str().unwrap().to_string();
    assert!(image.starts_with("/uploads/") && image.ends_with("-pen.png"), "{image}");

    // uploaded file is served back
    let (status, bytes) = app.send(empty_request("GET", &image)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, &b"first"[..]);

    let fields = [("name", "Gel Pen"), ("category", "Office"), ("price", "2.00")];
    let (status, body) = app
        .send_json(multipart_request("PUT", &format!("/api/products/{id}"), multipart(&fields, None))?)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(
        body["product"],
        json!({"id": id, "name": "Gel Pen", "category": "Office", "price": "2.00", "image": image})
    );

    let (status, body) = app
        .send_json(multipart_request(
            "PUT",
            &format!("/api/products/{id}"),
            multipart(&fields, Some(("new.png", &b"second"[..]))),
        )?)
        .await?;
    assert_eq!(status, StatusCode::OK);
    let new_image = body["product"]["image"].as_str().unwrap();
    assert!(new_image.ends_with("-new.png"));

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn unknown_and_non_numeric_ids_are_not_found() -> anyhow::Result<()> {
    let app = TestApp::start().await?;

    for uri in ["/api/products/12345", "/api/products/abc"] {
        let (status, _) = app.send_json(empty_request("GET", uri)?).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
        let (status, _) = app.send_json(empty_request("DELETE", uri)?).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
        let (status, _) = app.send_json(multipart_request("PUT", uri, multipart(PEN, None))?).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "PUT {uri}");
    }

    // the id is resolved before the fields are validated
    let fields = [("name", "Pen")];
    let (status, body) = app
        .send_json(multipart_request("PUT", "/api/products/12345", multipart(&fields, None))?)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Product not found"}));

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn malformed_document_yields_generic_500() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    tokio::fs::write(&app.storage.data_file, "{ definitely not json").await?;

    let (status, body) = app.send_json(empty_request("GET", "/api/products")?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Internal server error"}));

    let (status, _) = app
        .send_json(multipart_request("POST", "/api/products", multipart(PEN, None))?)
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let (status, body) = app.send_json(empty_request("GET", "/health")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    app.cleanup().await;
    Ok(())
}
