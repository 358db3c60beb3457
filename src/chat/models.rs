//! Chat data models
//!
//! Defines sessions and their embedded messages. Every temporal field goes
//! through [`canonical_time`], so the stored form is schema-driven: a text
//! field is never reinterpreted as a timestamp because of its content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to every new session
pub const DEFAULT_SESSION_TITLE: &str = "New Analysis";

/// Greeting seeded into every new session
pub const GREETING: &str = "Hello! How can I help you with supply chain analysis today?";

/// Sender of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user
    User,
    /// Message produced by the assistant
    Bot,
}

/// A single message embedded in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier for the message
    pub id: String,
    /// Content of the message
    pub text: String,
    /// Who sent the message
    pub sender: Sender,
    /// ID of the session this message belongs to
    pub session_id: String,
    /// When the message was created
    #[serde(with = "canonical_time")]
    pub timestamp: DateTime<Utc>,
}

/// An assistant reply. Structurally a `ChatMessage` whose sender is `Bot`.
pub type ChatResponse = ChatMessage;

impl ChatMessage {
    /// Create a new message with a fresh id, stamped now
    pub fn new(session_id: &str, sender: Sender, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            sender,
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Create a message sent by the user
    pub fn user(session_id: &str, text: String) -> Self {
        Self::new(session_id, Sender::User, text)
    }

    /// Create an assistant reply
    pub fn bot(session_id: &str, text: String) -> ChatResponse {
        Self::new(session_id, Sender::Bot, text)
    }
}

/// A conversation owned by one user, with its messages embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique identifier for the session
    pub id: String,
    /// Free-text title
    pub title: String,
    /// Owning user
    pub user_id: String,
    /// When the session was created
    #[serde(with = "canonical_time")]
    pub created_at: DateTime<Utc>,
    /// When the session last received a message
    #[serde(with = "canonical_time")]
    pub timestamp: DateTime<Utc>,
    /// Text of the most recent message, kept for cheap listing
    #[serde(default)]
    pub last_message: Option<String>,
    /// Conversation in insertion order; never empty
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Create a session for `user_id`, seeded with the greeting
    pub fn new(user_id: &str) -> Self {
        let id = Uuid::new_v4().to_string();
        let greeting = ChatMessage::bot(&id, GREETING.to_string());
        let now = greeting.timestamp;
        Self {
            id,
            title: DEFAULT_SESSION_TITLE.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            timestamp: now,
            last_message: Some(greeting.text.clone()),
            messages: vec![greeting],
        }
    }
}

/// Caller identity as handed over by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier
    pub id: String,
}

impl User {
    /// Create a user from its identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Canonical text form for stored timestamps
///
/// Writes RFC 3339 UTC with microseconds (`2026-01-02T03:04:05.123456Z`).
/// Reads RFC 3339 with any offset, or a naive ISO-8601 value taken as UTC.
pub mod canonical_time {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Render a timestamp in canonical form
    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse a stored timestamp
    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Serde serializer
    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    /// Serde deserializer
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", text)))
    }
}
