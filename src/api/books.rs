//! Book API endpoints.

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use serde_json::Value;
use tokio_stream::Stream;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::Book;
use crate::store::Updated;
use crate::AppState;

/// GET /api/books - List all books, newest first.
pub async fn list_books(State(state): State<AppState>) -> ApiResult<Vec<Book>> {
    let books = state.store.books.list().await?;
    success(books)
}

/// GET /api/books/:id - Get a single book.
pub async fn get_book(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Book> {
    match state.store.books.get(&id).await? {
        Some(book) => success(book),
        None => Err(AppError::NotFound(format!("Book {} not found", id))),
    }
}

/// POST /api/books - Create a new book.
pub async fn create_book(
    State(state): State<AppState>,
    Json(request): Json<Book>,
) -> ApiResult<Book> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("Url is required".to_string()));
    }

    let book = state.store.books.add(request).await?;
    success(book)
}

/// PUT /api/books/:id - Apply a partial update, returning before/after state.
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Updated<Book>> {
    let updated = state.store.books.update(&id, patch).await?;
    success(updated)
}

/// DELETE /api/books/:id - Delete a book, returning its prior state.
pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Book> {
    match state.store.books.delete(&id).await? {
        Some(book) => success(book),
        None => Err(AppError::NotFound(format!("Book {} not found", id))),
    }
}

/// GET /api/books/watch - Change feed of full book snapshots.
pub async fn watch_books(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    super::collection_feed(&state.store.books)
}
