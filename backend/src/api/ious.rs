//! IOU API handlers
//!
//! Contains HTTP request handlers for IOU CRUD operations.

use crate::error::AppError;
use crate::models::{Iou, IouId, IouPayload, ListParams, ListQuery};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
    /// Status indicator (e.g., "ok", "error")
    pub status: String,
}

/// GET /ious - List IOUs, optionally filtered by `?borrower=`
pub async fn list_ious(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Iou>>, AppError> {
    let ious = state.ious.list(ListQuery::from(params)).await?;
    Ok(Json(ious))
}

/// GET /ious/high - IOUs above the average amount
pub async fn list_high_value_ious(
    State(state): State<AppState>,
) -> Result<Json<Vec<Iou>>, AppError> {
    Ok(Json(state.ious.list_high_value().await?))
}

/// GET /ious/low - IOUs at or below the average amount
pub async fn list_low_value_ious(
    State(state): State<AppState>,
) -> Result<Json<Vec<Iou>>, AppError> {
    Ok(Json(state.ious.list_low_value().await?))
}

/// GET /ious/:id - Get a specific IOU
pub async fn get_iou(
    State(state): State<AppState>,
    path: Result<Path<IouId>, PathRejection>,
) -> Result<Json<Iou>, AppError> {
    let Path(id) = path?;
    Ok(Json(state.ious.get(id).await?))
}

/// POST /ious - Create a new IOU
pub async fn create_iou(
    State(state): State<AppState>,
    body: Result<Json<IouPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Iou>), AppError> {
    let Json(payload) = body?;
    let iou = state.ious.create(payload).await?;
    Ok((StatusCode::CREATED, Json(iou)))
}

/// PUT /ious/:id - Replace an IOU
pub async fn update_iou(
    State(state): State<AppState>,
    path: Result<Path<IouId>, PathRejection>,
    body: Result<Json<IouPayload>, JsonRejection>,
) -> Result<Json<Iou>, AppError> {
    let Path(id) = path?;
    let Json(payload) = body?;
    Ok(Json(state.ious.update(id, payload).await?))
}

/// DELETE /ious/:id - Delete an IOU
pub async fn delete_iou(
    State(state): State<AppState>,
    path: Result<Path<IouId>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = path?;
    state.ious.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "IOU deleted successfully".to_string(),
        status: "ok".to_string(),
    }))
}
