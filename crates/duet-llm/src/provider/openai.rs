//! OpenAI-compatible provider implementation

use async_trait::async_trait;
use duet_config::LlmConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use super::Provider;
use crate::error::LlmError;
use crate::protocol::openai::{OpenAiRequest, OpenAiResponse};
use crate::types::{CompletionRequest, CompletionResponse};

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    client: Client,
    completions_url: String,
    api_key: Option<SecretString>,
}

impl OpenAiProvider {
    /// Create from LLM configuration
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            completions_url: super::endpoint(config.base_url.as_ref(), DEFAULT_BASE_URL, "chat/completions"),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let wire_request = OpenAiRequest::from(request);

        let mut builder = self.client.post(&self.completions_url).json(&wire_request);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(provider = self.name(), error = %e, "upstream request failed");
            LlmError::Upstream(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = self.name(), status = %status, "upstream returned error");
            return Err(LlmError::from_status(status.as_u16(), body));
        }

        let wire_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(wire_response.into())
    }
}
