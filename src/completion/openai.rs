//! OpenAI chat completions client
//!
//! HTTP backend for any OpenAI-compatible `/chat/completions` endpoint. The
//! client trusts the roots of a configured CA bundle.

use crate::completion::backend::{BackendResponse, CompletionBackend};
use crate::completion::error::CompletionError;
use crate::completion::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::CompletionConfig;
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Handle;

/// Blocking OpenAI-compatible backend
///
/// Does not derive Debug so the API key never ends up in logs.
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    runtime: Handle,
}

impl OpenAiBackend {
    /// Validate configuration and build the HTTP client
    ///
    /// Must be called from within a tokio runtime; the runtime's handle is
    /// used to drive requests from the worker pool's blocking threads.
    ///
    /// # Errors
    /// * `MissingApiKey` - no (or an empty) API key is configured
    /// * `CaBundle` - the CA bundle is unreadable or holds no certificate
    /// * `ClientBuild` - the client could not be built or no runtime is running
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(CompletionError::MissingApiKey)?
            .to_string();

        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(path) = &config.ca_bundle {
            for certificate in load_ca_bundle(path)? {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let client = builder
            .build()
            .map_err(|e| CompletionError::ClientBuild(e.to_string()))?;

        let runtime = Handle::try_current()
            .map_err(|e| CompletionError::ClientBuild(format!("no async runtime: {}", e)))?;

        tracing::info!(
            base_url = %config.base_url,
            ca_bundle = ?config.ca_bundle,
            "OpenAI configuration completed successfully"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            runtime,
        })
    }

    async fn send(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<BackendResponse, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            "Calling completion API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(CompletionError::Upstream(format!(
                "API returned error status {}: {}",
                status.as_u16(),
                error_body
            )));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| CompletionError::Upstream(format!("failed to read body: {}", e)))?;

        let messages = match serde_json::from_str::<ChatCompletionResponse>(&raw) {
            Ok(parsed) => parsed.into_messages(),
            Err(e) => {
                tracing::debug!(error = %e, "Completion body is not a chat completion");
                Vec::new()
            }
        };

        Ok(BackendResponse { messages, raw })
    }
}

impl CompletionBackend for OpenAiBackend {
    fn exchange(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<BackendResponse, CompletionError> {
        self.runtime.block_on(self.send(request))
    }
}

fn load_ca_bundle(path: &Path) -> Result<Vec<reqwest::Certificate>, CompletionError> {
    let ca_error = |reason: String| CompletionError::CaBundle {
        path: path.display().to_string(),
        reason,
    };

    let pem = std::fs::read(path).map_err(|e| ca_error(e.to_string()))?;
    let certificates =
        reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| ca_error(e.to_string()))?;
    if certificates.is_empty() {
        return Err(ca_error("no certificates found".to_string()));
    }
    Ok(certificates)
}
