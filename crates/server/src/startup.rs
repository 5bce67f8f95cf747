use std::sync::Arc;

use axum::Router;
use configs::{AppConfig, StorageConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::ServerState;
use service::{
    products::ProductService,
    storage::{DiskBlobStore, JsonFileStore},
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the product document and upload directory and wire the service.
pub async fn build_state(storage: &StorageConfig) -> anyhow::Result<ServerState> {
    let store = JsonFileStore::new(&storage.data_file).await?;
    let blobs = DiskBlobStore::new(&storage.upload_dir, &storage.public_prefix).await?;
    Ok(ServerState { products: Arc::new(ProductService::new(store, blobs)) })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg.storage).await?;
    let app: Router = routes::build_router(state, build_cors(), &cfg.storage);

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(
        %addr,
        data_file = %cfg.storage.data_file,
        upload_dir = %cfg.storage.upload_dir,
        "catalog server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
