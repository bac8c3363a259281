//! Health check handlers.

use axum::{http::StatusCode, response::IntoResponse, Json};

/// Liveness check - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Health check with service identity.
pub async fn health_check(service: String, version: String) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": service,
            "version": version,
        })),
    )
}
