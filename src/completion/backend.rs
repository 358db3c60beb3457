//! Completion backend seam
//!
//! A backend performs one blocking request/response exchange. The adapter
//! owns model and prompt configuration and only hands the backend a fully
//! built request.

use crate::completion::error::CompletionError;
use crate::completion::types::{ChatCompletionRequest, RoleMessage, ROLE_ASSISTANT};

/// Result of one exchange with the completion service
#[derive(Debug, Clone, Default)]
pub struct BackendResponse {
    /// Role-tagged messages returned by the service, in order
    pub messages: Vec<RoleMessage>,
    /// Raw response body
    pub raw: String,
}

/// A synchronous chat-completion backend
///
/// Implementations block the calling thread; callers on the async runtime
/// must go through [`crate::completion::CompletionAdapter::get_response_async`].
pub trait CompletionBackend: Send + Sync {
    /// Send `request` and wait for the reply. Exactly one attempt is made.
    fn exchange(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<BackendResponse, CompletionError>;
}

/// Pick the reply text out of a backend response
///
/// Returns the content of the last `assistant` entry (empty if it carries no
/// text). Without any assistant entry the raw body is returned as-is.
pub fn extract_reply(response: BackendResponse) -> String {
    match response
        .messages
        .into_iter()
        .rev()
        .find(|m| m.role == ROLE_ASSISTANT)
    {
        Some(message) => message.content.unwrap_or_default(),
        None => response.raw,
    }
}
