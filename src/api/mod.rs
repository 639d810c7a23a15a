//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod admin;
mod batches;
mod books;
mod chat;
mod live_classes;
mod overview;
mod portals;
mod sessions;

pub use admin::*;
pub use batches::*;
pub use books::*;
pub use chat::*;
pub use live_classes::*;
pub use overview::*;
pub use portals::*;
pub use sessions::*;

use axum::{
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use crate::store::{Collection, Document};

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Server-sent change feed for one collection: emits the full newest-first
/// snapshot immediately and again after every mutation.
pub(crate) fn collection_feed<T: Document>(
    collection: &Collection<T>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(collection.subscribe())
        .map(|snapshot| Event::default().json_data(&snapshot));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
