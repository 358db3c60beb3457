//! Completion module
//!
//! Talks to the chat-completion service: the blocking backend, the bounded
//! worker pool that runs it, and the adapter that ties both to the model
//! configuration.

pub mod adapter;
pub mod backend;
pub mod error;
pub mod openai;
pub mod pool;
pub mod prompt;
pub mod types;

pub use adapter::CompletionAdapter;
pub use backend::{BackendResponse, CompletionBackend};
pub use error::CompletionError;
pub use openai::OpenAiBackend;
pub use pool::WorkerPool;
