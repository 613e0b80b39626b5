use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::signaling::{SignalingService, ws_handler};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::info;

pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/signal", get(ws_handler))
        .with_state(service)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind_addr()?).await?;
    serve_on(listener, config).await
}

/// Runs the server on an already bound listener until it fails.
pub async fn serve_on(listener: TcpListener, config: ServerConfig) -> Result<(), ServerError> {
    info!("Signaling server listening on {}", listener.local_addr()?);
    let service = SignalingService::new(config.ice_servers);
    axum::serve(listener, router(service)).await?;
    Ok(())
}
