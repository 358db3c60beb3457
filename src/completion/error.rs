//! Completion-specific error types

use thiserror::Error;

/// Errors raised while building or calling the completion backend
#[derive(Error, Debug)]
pub enum CompletionError {
    /// No API credential was configured
    #[error("OpenAI API key not found in environment variables")]
    MissingApiKey,

    /// The CA bundle could not be read or parsed
    #[error("Invalid CA bundle {path}: {reason}")]
    CaBundle {
        /// Path of the bundle
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The backend call itself failed (transport, status, body)
    #[error("Completion backend error: {0}")]
    Upstream(String),

    /// Generic failure handed to async callers; carries no backend detail
    #[error("AI response failed")]
    UpstreamFailure,
}

impl CompletionError {
    /// True for errors raised while constructing the backend
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CompletionError::MissingApiKey
                | CompletionError::CaBundle { .. }
                | CompletionError::ClientBuild(_)
        )
    }
}
