//! Chat API endpoints
//!
//! Handles HTTP requests for chat sessions and messages.

use crate::api::utils::{validate_message, CurrentUser, RouterState};
use crate::chat::{ChatMessage, ChatResponse, ChatSession};
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

/// Request to send a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message text
    pub text: String,
}

/// Acknowledgement returned after a delete
#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    /// Human-readable status
    pub message: String,
    /// ID of the deleted session
    pub id: String,
}

/// POST /api/chat/sessions - Open a new session
pub async fn create_session(
    State(chat): State<RouterState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ChatSession>, AppError> {
    Ok(Json(chat.create_session(&user.id).await?))
}

/// GET /api/chat/sessions - List the caller's sessions, most recent first
pub async fn list_sessions(
    State(chat): State<RouterState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ChatSession>>, AppError> {
    Ok(Json(chat.list_sessions(&user.id).await?))
}

/// GET /api/chat/sessions/:id/messages - Messages of one session
pub async fn get_session_messages(
    State(chat): State<RouterState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    Ok(Json(chat.get_session_messages(&id, &user.id).await?))
}

/// POST /api/chat/sessions/:id/messages - Send a message, get the reply
pub async fn send_message(
    State(chat): State<RouterState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_message(&request.text)?;
    Ok(Json(chat.process_message(&request.text, &id, &user).await?))
}

/// DELETE /api/chat/sessions/:id - Delete a session
pub async fn delete_session(
    State(chat): State<RouterState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteSessionResponse>, AppError> {
    chat.delete_session(&id, &user.id).await?;
    Ok(Json(DeleteSessionResponse {
        message: "Chat session deleted successfully".to_string(),
        id,
    }))
}
