//! Chat API endpoints driving the shared assistant session.

use axum::{extract::State, Json};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::chat::{ChatMessage, InlineData};
use crate::AppState;

/// POST /api/chat body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSendRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub attachment: Option<InlineData>,
}

/// POST /api/chat - Send a message and get the assistant's reply. Upstream
/// failures come back as a canned in-conversation reply, not an error.
pub async fn send_chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatSendRequest>,
) -> ApiResult<ChatMessage> {
    let mut session = state.chat.lock().await;
    let reply = session.send(&request.message, request.attachment).await?;
    success(reply)
}

/// GET /api/chat - The visible transcript, oldest first.
pub async fn chat_transcript(State(state): State<AppState>) -> ApiResult<Vec<ChatMessage>> {
    let session = state.chat.lock().await;
    success(session.transcript().to_vec())
}
