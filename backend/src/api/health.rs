//! Liveness endpoints

use axum::Json;
use serde::Serialize;

/// Root greeting
#[derive(Serialize)]
pub struct HelloResponse {
    /// Greeting text
    pub message: String,
    /// Always "ok"
    pub status: String,
}

/// Health check payload
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
    /// Human-readable detail
    pub message: String,
}

/// GET /
pub async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from IOU Tracker Backend!".to_string(),
        status: "ok".to_string(),
    })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}
