//! HTTP handlers for the Note Store.

pub mod history;
pub mod notes;
pub mod transfer;

use axum::{response::IntoResponse, Json};

/// `GET /` liveness message.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Notely Note Store is running",
    }))
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
