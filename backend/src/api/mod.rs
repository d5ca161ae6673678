//! API module
//!
//! Contains HTTP request handlers and the router that mounts them.

pub mod health;
pub mod ious;
pub mod middleware;

use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router with all routes and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::hello_world))
        .route("/health", get(health::health_check))
        .route("/ious", get(ious::list_ious).post(ious::create_iou))
        // Static segments take precedence over `:id`
        .route("/ious/high", get(ious::list_high_value_ious))
        .route("/ious/low", get(ious::list_low_value_ious))
        .route(
            "/ious/:id",
            get(ious::get_iou)
                .put(ious::update_iou)
                .delete(ious::delete_iou),
        )
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
