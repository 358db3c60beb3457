//! Session gateway
//!
//! CRUD over the `chat_sessions` collection. Every lookup is keyed on both
//! the session id and the owning user, so a foreign session is reported
//! exactly like a missing one.

use crate::chat::models::{canonical_time, ChatMessage, ChatResponse, ChatSession};
use crate::error::AppError;
use crate::store::{Collection, DocumentStore, Filter, Sort, StoreError, Update};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

/// Collection holding one document per session, messages embedded
pub const SESSIONS_COLLECTION: &str = "chat_sessions";

/// Reserved for standalone message records; not used by the session gateway
pub const MESSAGES_COLLECTION: &str = "chat_messages";

/// Gateway over stored chat sessions
#[derive(Clone)]
pub struct SessionStore {
    sessions: Collection,
}

impl SessionStore {
    /// Create a gateway on top of a document store
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            sessions: store.collection(SESSIONS_COLLECTION),
        }
    }

    /// Create a new session for `user_id`, seeded with the greeting
    ///
    /// # Returns
    /// * `Ok(ChatSession)` - The session as created (typed, not serialized)
    /// * `Err(AppError::Internal)` - If the insert failed
    pub async fn create_session(&self, user_id: &str) -> Result<ChatSession, AppError> {
        let session = ChatSession::new(user_id);

        let result = match serde_json::to_value(&session) {
            Ok(document) => self.sessions.insert_one(&document).await,
            Err(e) => Err(StoreError::from(e)),
        };

        result.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Failed to create chat session");
            AppError::internal("Failed to create chat session")
        })?;

        info!(session_id = %session.id, user_id = %user_id, "Created chat session");
        Ok(session)
    }

    /// List the sessions owned by `user_id`, most recent first
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, AppError> {
        let filter = Filter::new().eq("user_id", user_id);
        let documents = self
            .sessions
            .find(&filter, Some(&Sort::descending("timestamp")))
            .await
            .map_err(|e| {
                error!(user_id = %user_id, error = %e, "Failed to get user sessions");
                AppError::internal("Failed to fetch chat sessions")
            })?;

        // Undecodable documents are skipped, not fatal
        Ok(documents
            .into_iter()
            .filter_map(|document| match decode_session(document) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Skipping undecodable chat session");
                    None
                }
            })
            .collect())
    }

    /// Messages of one session, in conversation order
    ///
    /// # Errors
    /// * `AppError::NotFound` - No session with this id belongs to `user_id`
    /// * `AppError::Internal` - The store failed
    pub async fn get_session_messages(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let session = self
            .find_session(session_id, user_id)
            .await
            .map_err(|e| {
                error!(session_id = %session_id, error = %e, "Failed to get session messages");
                AppError::internal("Failed to fetch session messages")
            })?
            .ok_or_else(AppError::session_not_found)?;

        Ok(session.messages)
    }

    /// Delete one session owned by `user_id`
    ///
    /// # Errors
    /// * `AppError::NotFound` - Nothing was deleted (unknown id or foreign owner)
    /// * `AppError::Internal` - The store failed
    pub async fn delete_session(&self, session_id: &str, user_id: &str) -> Result<(), AppError> {
        let deleted = self
            .sessions
            .delete_one(&owned_by(session_id, user_id))
            .await
            .map_err(|e| {
                error!(session_id = %session_id, error = %e, "Failed to delete session");
                AppError::internal("Failed to delete chat session")
            })?;

        if deleted == 0 {
            return Err(AppError::session_not_found());
        }

        info!(session_id = %session_id, user_id = %user_id, "Deleted chat session");
        Ok(())
    }

    /// Look up a session by id and owner
    pub async fn find_session(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<ChatSession>, StoreError> {
        self.sessions
            .find_one(&owned_by(session_id, user_id))
            .await?
            .map(decode_session)
            .transpose()
    }

    /// Append a user/bot pair and refresh the listing fields in one update
    ///
    /// # Returns
    /// * `Ok(n)` - Number of sessions modified; 0 if the session vanished
    pub async fn append_exchange(
        &self,
        session_id: &str,
        user_message: &ChatMessage,
        response: &ChatResponse,
    ) -> Result<u64, StoreError> {
        let update = Update::new()
            .push_each(
                "messages",
                vec![
                    serde_json::to_value(user_message)?,
                    serde_json::to_value(response)?,
                ],
            )
            .set("last_message", json!(response.text))
            .set("timestamp", json!(canonical_time::format(&Utc::now())));

        let modified = self
            .sessions
            .update_one(&Filter::new().eq("id", session_id), &update)
            .await?;

        debug!(session_id = %session_id, modified, "Appended exchange");
        Ok(modified)
    }
}

fn owned_by(session_id: &str, user_id: &str) -> Filter {
    Filter::new().eq("id", session_id).eq("user_id", user_id)
}

/// Decode a stored session. Sessions written without `created_at` take
/// their `timestamp` as creation time.
fn decode_session(mut document: Value) -> Result<ChatSession, StoreError> {
    if let Some(fields) = document.as_object_mut() {
        if !fields.contains_key("created_at") {
            if let Some(timestamp) = fields.get("timestamp").cloned() {
                fields.insert("created_at".to_string(), timestamp);
            }
        }
    }
    Ok(serde_json::from_value(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::Sender;
    use chrono::Timelike;
    use tempfile::TempDir;

    async fn create_test_sessions() -> (SessionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::open(&temp_dir.path().join("test.db"))
            .await
            .expect("Failed to create test database");
        (SessionStore::new(&store), temp_dir)
    }

    #[tokio::test]
    async fn test_create_session_is_persisted() {
        let (sessions, _temp_dir) = create_test_sessions().await;
        let session = sessions.create_session("u1").await.unwrap();

        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].sender, Sender::Bot);

        let stored = sessions.find_session(&session.id, "u1").await.unwrap();
        assert!(stored.is_some());
        assert_eq!(stored.unwrap().title, "New Analysis");
    }

    #[tokio::test]
    async fn test_timestamps_round_trip() {
        let (sessions, _temp_dir) = create_test_sessions().await;
        let session = sessions.create_session("u1").await.unwrap();
        let stored = sessions
            .find_session(&session.id, "u1")
            .await
            .unwrap()
            .unwrap();

        let micros = |ts: chrono::DateTime<Utc>| ts.nanosecond() / 1000;
        assert_eq!(stored.created_at.timestamp(), session.created_at.timestamp());
        assert_eq!(micros(stored.created_at), micros(session.created_at));
        assert_eq!(
            micros(stored.messages[0].timestamp),
            micros(session.messages[0].timestamp)
        );
    }

    #[tokio::test]
    async fn test_list_sessions_most_recent_first() {
        let (sessions, _temp_dir) = create_test_sessions().await;
        let first = sessions.create_session("u1").await.unwrap();
        let second = sessions.create_session("u1").await.unwrap();
        sessions.create_session("u2").await.unwrap();

        // Touch the older session so it becomes the most recent
        let user = ChatMessage::user(&first.id, "hi".to_string());
        let bot = ChatMessage::bot(&first.id, "hello".to_string());
        sessions.append_exchange(&first.id, &user, &bot).await.unwrap();

        let listed = sessions.list_sessions("u1").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
        assert_eq!(listed[0].last_message.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_list_sessions_legacy_and_malformed_documents() {
        let (sessions, _temp_dir) = create_test_sessions().await;
        let current = sessions.create_session("u1").await.unwrap();

        // Older schema: no created_at, naive timestamps
        let legacy = json!({
            "id": "legacy-1",
            "title": "Old Analysis",
            "user_id": "u1",
            "timestamp": "2024-01-15T09:30:00.123456",
            "last_message": "Earlier reply",
            "messages": [{
                "id": "m1",
                "text": "Earlier reply",
                "sender": "bot",
                "session_id": "legacy-1",
                "timestamp": "2024-01-15T09:30:00.123456"
            }]
        });
        sessions.sessions.insert_one(&legacy).await.unwrap();
        let broken = json!({"id": "broken-1", "user_id": "u1", "timestamp": "2023-01-01T00:00:00"});
        sessions.sessions.insert_one(&broken).await.unwrap();

        let listed = sessions.list_sessions("u1").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![current.id.as_str(), "legacy-1"]);
        assert_eq!(listed[1].created_at, listed[1].timestamp);
        assert_eq!(listed[1].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_list_sessions_empty() {
        let (sessions, _temp_dir) = create_test_sessions().await;
        assert!(sessions.list_sessions("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_session_messages_foreign_owner() {
        let (sessions, _temp_dir) = create_test_sessions().await;
        let session = sessions.create_session("u1").await.unwrap();

        let result = sessions.get_session_messages(&session.id, "u2").await;
        assert_eq!(result.unwrap_err(), AppError::session_not_found());
    }

    #[tokio::test]
    async fn test_append_exchange_order() {
        let (sessions, _temp_dir) = create_test_sessions().await;
        let session = sessions.create_session("u1").await.unwrap();

        let user = ChatMessage::user(&session.id, "What is RCA?".to_string());
        let bot = ChatMessage::bot(&session.id, "Root cause analysis.".to_string());
        let modified = sessions
            .append_exchange(&session.id, &user, &bot)
            .await
            .unwrap();
        assert_eq!(modified, 1);

        let messages = sessions
            .get_session_messages(&session.id, "u1")
            .await
            .unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].id, user.id);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[2].id, bot.id);
        assert_eq!(messages[2].sender, Sender::Bot);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (sessions, _temp_dir) = create_test_sessions().await;
        let session = sessions.create_session("u1").await.unwrap();

        // Foreign owner cannot delete
        let foreign = sessions.delete_session(&session.id, "u2").await;
        assert_eq!(foreign.unwrap_err(), AppError::session_not_found());

        sessions.delete_session(&session.id, "u1").await.unwrap();

        let again = sessions.delete_session(&session.id, "u1").await;
        assert_eq!(again.unwrap_err(), AppError::session_not_found());

        let messages = sessions.get_session_messages(&session.id, "u1").await;
        assert_eq!(messages.unwrap_err(), AppError::session_not_found());
    }
}
