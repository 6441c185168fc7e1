//! Anthropic Messages API provider implementation

use async_trait::async_trait;
use duet_config::LlmConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use super::Provider;
use crate::error::LlmError;
use crate::protocol::anthropic::{AnthropicRequest, AnthropicResponse};
use crate::types::{CompletionRequest, CompletionResponse};

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: Client,
    messages_url: String,
    api_key: Option<SecretString>,
}

impl AnthropicProvider {
    /// Create from LLM configuration
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_none() {
            return Err(LlmError::Config("llm.api_key is required for the anthropic provider".to_owned()));
        }

        Ok(Self {
            client: Client::new(),
            messages_url: super::endpoint(config.base_url.as_ref(), DEFAULT_BASE_URL, "messages"),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let wire_request = AnthropicRequest::from(request);

        let mut builder = self
            .client
            .post(&self.messages_url)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&wire_request);

        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key.expose_secret());
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

        let wire_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(wire_response.into())
    }
}
