//! SmartChat Backend Library
//!
//! Chat sessions stored as documents, an LLM completion adapter and the
//! service that ties them together. The binary is in `src/main.rs`.

pub mod api;
pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod store;
