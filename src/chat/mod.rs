//! Chat module
//!
//! Chat sessions with embedded messages, stored as documents, and the
//! service that runs a conversation turn against the completion adapter.

pub mod models;
pub mod service;
pub mod sessions;

pub use models::{ChatMessage, ChatResponse, ChatSession, Sender, User};
pub use service::ChatService;
pub use sessions::SessionStore;
