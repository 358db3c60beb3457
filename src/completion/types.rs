//! Chat completion wire types
//!
//! Structs that mirror the OpenAI chat completions JSON format.

use serde::{Deserialize, Serialize};

/// Role of a completion message
pub const ROLE_SYSTEM: &str = "system";
/// Role of the user turn
pub const ROLE_USER: &str = "user";
/// Role of model replies
pub const ROLE_ASSISTANT: &str = "assistant";

/// A role-tagged message, used both in requests and responses
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoleMessage {
    /// "system", "user", "assistant" or "tool"
    pub role: String,
    /// Text content; absent when the model only issued tool calls
    #[serde(default)]
    pub content: Option<String>,
}

impl RoleMessage {
    /// Build a message with text content
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
        }
    }
}

/// Request body for `POST /chat/completions`
#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// System context followed by the user turn
    pub messages: Vec<RoleMessage>,
}

/// Response body of `POST /chat/completions`
#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    /// Candidate completions
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// A single completion choice
#[derive(Deserialize, Debug)]
pub struct Choice {
    /// The produced message
    pub message: RoleMessage,
    /// Why the model stopped generating
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatCompletionResponse {
    /// The role-tagged messages of every choice, in order
    pub fn into_messages(self) -> Vec<RoleMessage> {
        self.choices.into_iter().map(|c| c.message).collect()
    }
}
