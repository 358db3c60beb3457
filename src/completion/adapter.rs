//! Completion adapter
//!
//! Holds the model, temperature and system prompt, and turns one user
//! message into one assistant reply. The blocking exchange runs on the
//! adapter's bounded worker pool so async callers are never stalled.

use crate::completion::backend::{extract_reply, CompletionBackend};
use crate::completion::error::CompletionError;
use crate::completion::openai::OpenAiBackend;
use crate::completion::pool::WorkerPool;
use crate::completion::prompt::system_prompt;
use crate::completion::types::{ChatCompletionRequest, RoleMessage, ROLE_SYSTEM, ROLE_USER};
use crate::config::CompletionConfig;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info};

/// Adapter between chat sessions and the completion backend
///
/// Build one per process and share it (`Arc<CompletionAdapter>`); its
/// worker pool bounds the number of in-flight completion calls.
pub struct CompletionAdapter {
    backend: Arc<dyn CompletionBackend>,
    pool: WorkerPool,
    model: String,
    temperature: f32,
    system_prompt: String,
}

impl CompletionAdapter {
    /// Build the OpenAI backend from configuration and wrap it
    ///
    /// # Errors
    /// Configuration errors (missing key, bad CA bundle) are returned as-is
    /// and should abort startup.
    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let backend = OpenAiBackend::new(config).map_err(|e| {
            error!(error = %e, "Failed to configure completion backend");
            e
        })?;
        Ok(Self::new(Arc::new(backend), config))
    }

    /// Wrap an existing backend using the model settings from `config`
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &CompletionConfig) -> Self {
        info!(
            model = %config.model,
            temperature = config.temperature,
            workers = config.worker_threads,
            "Completion adapter ready"
        );
        Self {
            backend,
            pool: WorkerPool::new(config.worker_threads),
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: system_prompt(),
        }
    }

    /// Replace the default system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// The worker pool, for saturation metrics
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Get a reply for `message`, blocking the current thread
    ///
    /// Inside a tokio runtime this returns an error without contacting the
    /// backend; async callers use [`Self::get_response_async`].
    pub fn get_response(&self, message: &str) -> Result<String, CompletionError> {
        if Handle::try_current().is_ok() {
            error!("Blocking completion call attempted inside the async runtime");
            return Err(CompletionError::Upstream(
                "blocking call inside async runtime; use get_response_async".to_string(),
            ));
        }
        exchange_reply(self.backend.as_ref(), &self.build_request(message))
    }

    /// Get a reply for `message` without blocking the async runtime
    ///
    /// # Arguments
    /// * `message` - Raw user text
    /// * `caller_id` - User id, logged if the call fails
    ///
    /// # Errors
    /// Every failure is logged with its cause and returned as the generic
    /// `CompletionError::UpstreamFailure`.
    pub async fn get_response_async(
        &self,
        message: &str,
        caller_id: &str,
    ) -> Result<String, CompletionError> {
        let backend = Arc::clone(&self.backend);
        let request = self.build_request(message);

        match self
            .pool
            .run(move || exchange_reply(backend.as_ref(), &request))
            .await
        {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                error!(user_id = %caller_id, error = %e, "AI service error");
                Err(CompletionError::UpstreamFailure)
            }
            Err(e) => {
                error!(user_id = %caller_id, error = %e, "AI worker pool error");
                Err(CompletionError::UpstreamFailure)
            }
        }
    }

    fn build_request(&self, message: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                RoleMessage::new(ROLE_SYSTEM, self.system_prompt.as_str()),
                RoleMessage::new(ROLE_USER, message),
            ],
        }
    }
}

fn exchange_reply(
    backend: &dyn CompletionBackend,
    request: &ChatCompletionRequest,
) -> Result<String, CompletionError> {
    let response = backend.exchange(request).map_err(|e| {
        error!(error = %e, "Completion backend error");
        e
    })?;
    Ok(extract_reply(response))
}
