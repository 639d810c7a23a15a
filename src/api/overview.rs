//! Aggregate snapshot endpoints backed by the data hub.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::hub::HubStatus;
use crate::models::{Batch, Book, GoLiveSession, LiveClass};
use crate::AppState;

/// The hub's cached view of all four public collections.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub status: HubStatus,
    pub batches: Vec<Batch>,
    pub live_classes: Vec<LiveClass>,
    pub books: Vec<Book>,
    pub go_live_sessions: Vec<GoLiveSession>,
}

/// GET /api/overview - Current hub snapshot and connection status.
pub async fn get_overview(State(state): State<AppState>) -> ApiResult<Overview> {
    success(Overview {
        status: state.hub.status().await,
        batches: state.hub.batches().await,
        live_classes: state.hub.live_classes().await,
        books: state.hub.books().await,
        go_live_sessions: state.hub.sessions().await,
    })
}

/// POST /api/overview/retry - Re-run the whole bootstrap (user-triggered).
pub async fn retry_connection(State(state): State<AppState>) -> ApiResult<HubStatus> {
    state.hub.retry_connection().await;
    success(state.hub.status().await)
}
