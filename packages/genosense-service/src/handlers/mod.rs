pub mod data;
pub mod pages;
pub mod predict;
pub mod sample_data;
pub mod upload;

use axum::{response::IntoResponse, Json};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "genosense-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
