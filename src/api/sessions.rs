//! Go-live session API endpoints.

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use serde_json::Value;
use tokio_stream::Stream;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::GoLiveSession;
use crate::store::Updated;
use crate::AppState;

/// GET /api/sessions - List all go-live sessions, newest first.
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Vec<GoLiveSession>> {
    let sessions = state.store.sessions.list().await?;
    success(sessions)
}

/// GET /api/sessions/:id - Get a single go-live session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<GoLiveSession> {
    match state.store.sessions.get(&id).await? {
        Some(session) => success(session),
        None => Err(AppError::NotFound(format!(
            "Go-live session {} not found",
            id
        ))),
    }
}

/// POST /api/sessions - Create a new go-live session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<GoLiveSession>,
) -> ApiResult<GoLiveSession> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if request.batch_id.trim().is_empty() {
        return Err(AppError::Validation("Batch id is required".to_string()));
    }

    let session = state.store.sessions.add(request).await?;
    success(session)
}

/// PUT /api/sessions/:id - Apply a partial update, returning before/after state.
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Updated<GoLiveSession>> {
    let updated = state.store.sessions.update(&id, patch).await?;
    success(updated)
}

/// DELETE /api/sessions/:id - Delete a go-live session, returning its prior state.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<GoLiveSession> {
    match state.store.sessions.delete(&id).await? {
        Some(session) => success(session),
        None => Err(AppError::NotFound(format!(
            "Go-live session {} not found",
            id
        ))),
    }
}

/// GET /api/sessions/watch - Change feed of full go-live-session snapshots.
pub async fn watch_sessions(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    super::collection_feed(&state.store.sessions)
}
