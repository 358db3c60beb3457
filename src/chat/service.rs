//! Conversation service
//!
//! Coordinates the session gateway and the completion adapter: checks that
//! the caller owns the session, gets the assistant's reply and appends the
//! user/bot pair.

use crate::chat::models::{ChatMessage, ChatResponse, ChatSession, User};
use crate::chat::sessions::SessionStore;
use crate::completion::CompletionAdapter;
use crate::error::AppError;
use crate::store::DocumentStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Chat operations exposed to the HTTP layer
#[derive(Clone)]
pub struct ChatService {
    sessions: SessionStore,
    adapter: Arc<CompletionAdapter>,
}

impl ChatService {
    /// Create the service from its two collaborators
    pub fn new(store: &DocumentStore, adapter: Arc<CompletionAdapter>) -> Self {
        Self {
            sessions: SessionStore::new(store),
            adapter,
        }
    }

    /// The completion adapter, for pool metrics
    pub fn adapter(&self) -> &CompletionAdapter {
        &self.adapter
    }

    /// See [`SessionStore::create_session`]
    pub async fn create_session(&self, user_id: &str) -> Result<ChatSession, AppError> {
        self.sessions.create_session(user_id).await
    }

    /// See [`SessionStore::list_sessions`]
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, AppError> {
        self.sessions.list_sessions(user_id).await
    }

    /// See [`SessionStore::get_session_messages`]
    pub async fn get_session_messages(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        self.sessions.get_session_messages(session_id, user_id).await
    }

    /// See [`SessionStore::delete_session`]
    pub async fn delete_session(&self, session_id: &str, user_id: &str) -> Result<(), AppError> {
        self.sessions.delete_session(session_id, user_id).await
    }

    /// Send `text` to the assistant within a session and record the exchange
    ///
    /// The session is looked up by (id, owner) first; nothing is written
    /// unless the assistant replied. The two new messages are appended in one
    /// store update. If that update fails the reply is lost and only logged.
    ///
    /// # Returns
    /// * `Ok(ChatResponse)` - The assistant's reply
    /// * `Err(AppError::NotFound)` - Session missing or owned by someone else
    /// * `Err(AppError::Internal)` - Completion or store failure
    pub async fn process_message(
        &self,
        text: &str,
        session_id: &str,
        user: &User,
    ) -> Result<ChatResponse, AppError> {
        self.sessions
            .find_session(session_id, &user.id)
            .await
            .map_err(|e| {
                error!(session_id = %session_id, error = %e, "Failed to process message");
                AppError::internal("Failed to process message")
            })?
            .ok_or_else(AppError::session_not_found)?;

        let user_message = ChatMessage::user(session_id, text.to_string());

        let reply = self
            .adapter
            .get_response_async(text, &user.id)
            .await
            .map_err(|_| AppError::internal("Failed to generate AI response"))?;

        let response = ChatMessage::bot(session_id, reply);

        match self
            .sessions
            .append_exchange(session_id, &user_message, &response)
            .await
        {
            Ok(0) => warn!(
                session_id = %session_id,
                "Session disappeared before the exchange was stored"
            ),
            Ok(_) => info!(
                session_id = %session_id,
                user_id = %user.id,
                reply_len = response.text.len(),
                "Processed chat message"
            ),
            Err(e) => {
                error!(
                    session_id = %session_id,
                    reply_len = response.text.len(),
                    error = %e,
                    "Failed to process message; reply was not stored"
                );
                return Err(AppError::internal("Failed to process message"));
            }
        }

        Ok(response)
    }
}
