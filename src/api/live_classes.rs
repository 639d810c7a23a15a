//! Live class API endpoints.

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use serde_json::Value;
use tokio_stream::Stream;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::LiveClass;
use crate::store::Updated;
use crate::AppState;

/// GET /api/live-classes - List all live classes, newest first.
pub async fn list_live_classes(State(state): State<AppState>) -> ApiResult<Vec<LiveClass>> {
    let live_classes = state.store.live_classes.list().await?;
    success(live_classes)
}

/// GET /api/live-classes/:id - Get a single live class.
pub async fn get_live_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LiveClass> {
    match state.store.live_classes.get(&id).await? {
        Some(live_class) => success(live_class),
        None => Err(AppError::NotFound(format!("Live class {} not found", id))),
    }
}

/// POST /api/live-classes - Create a new live class.
pub async fn create_live_class(
    State(state): State<AppState>,
    Json(request): Json<LiveClass>,
) -> ApiResult<LiveClass> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if request.batch_id.trim().is_empty() {
        return Err(AppError::Validation("Batch id is required".to_string()));
    }

    let live_class = state.store.live_classes.add(request).await?;
    success(live_class)
}

/// PUT /api/live-classes/:id - Apply a partial update, returning before/after state.
pub async fn update_live_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Updated<LiveClass>> {
    let updated = state.store.live_classes.update(&id, patch).await?;
    success(updated)
}

/// DELETE /api/live-classes/:id - Delete a live class, returning its prior state.
pub async fn delete_live_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LiveClass> {
    match state.store.live_classes.delete(&id).await? {
        Some(live_class) => success(live_class),
        None => Err(AppError::NotFound(format!("Live class {} not found", id))),
    }
}

/// GET /api/live-classes/watch - Change feed of full live-class snapshots.
pub async fn watch_live_classes(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    super::collection_feed(&state.store.live_classes)
}
