//! Batch API endpoints.

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use serde_json::Value;
use tokio_stream::Stream;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::Batch;
use crate::store::Updated;
use crate::AppState;

/// GET /api/batches - List all batches, newest first.
pub async fn list_batches(State(state): State<AppState>) -> ApiResult<Vec<Batch>> {
    let batches = state.store.batches.list().await?;
    success(batches)
}

/// GET /api/batches/:id - Get a single batch.
pub async fn get_batch(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Batch> {
    match state.store.batches.get(&id).await? {
        Some(batch) => success(batch),
        None => Err(AppError::NotFound(format!("Batch {} not found", id))),
    }
}

/// POST /api/batches - Create a new batch.
pub async fn create_batch(
    State(state): State<AppState>,
    Json(request): Json<Batch>,
) -> ApiResult<Batch> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let batch = state.store.batches.add(request).await?;
    success(batch)
}

/// PUT /api/batches/:id - Apply a partial update, returning before/after state.
pub async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Updated<Batch>> {
    let updated = state.store.batches.update(&id, patch).await?;
    success(updated)
}

/// DELETE /api/batches/:id - Delete a batch, returning its prior state.
pub async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Batch> {
    match state.store.batches.delete(&id).await? {
        Some(batch) => success(batch),
        None => Err(AppError::NotFound(format!("Batch {} not found", id))),
    }
}

/// GET /api/batches/watch - Change feed of full batch snapshots.
pub async fn watch_batches(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    super::collection_feed(&state.store.batches)
}
