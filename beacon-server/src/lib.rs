pub mod room;
pub mod signaling;

pub use room::RoomTable;
pub use signaling::{
    ConnectionHandle, ConnectionRegistry, MessageRouter, SignalingService, ws_handler,
};

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

/// The relay's HTTP surface: the signaling socket plus a liveness probe.
/// Auth, user CRUD and room metadata live in a separate service.
pub fn app(service: SignalingService) -> Router {
    Router::new()
        .route("/ws/{user_id}", get(signaling::ws_handler))
        .route("/health", get(health))
        .with_state(service)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
