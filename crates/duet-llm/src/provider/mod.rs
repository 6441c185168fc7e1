//! Provider trait and implementations for LLM backends

pub mod anthropic;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use duet_config::{LlmConfig, LlmProviderType};

use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse};

/// Trait implemented by each LLM provider backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Send a non-streaming completion request
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Build the configured provider
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn Provider>, LlmError> {
    tracing::debug!(provider = config.provider_type.as_str(), model = %config.model, "initializing LLM provider");

    let provider: Arc<dyn Provider> = match config.provider_type {
        LlmProviderType::Openai => Arc::new(openai::OpenAiProvider::new(config)),
        LlmProviderType::Anthropic => Arc::new(anthropic::AnthropicProvider::new(config)?),
    };

    Ok(provider)
}

/// Join a configured or default base URL with an endpoint path
fn endpoint(base_url: Option<&url::Url>, default: &str, path: &str) -> String {
    let base = base_url.map_or(default, url::Url::as_str).trim_end_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trims_trailing_slash() {
        let base = url::Url::parse("http://127.0.0.1:8080/v1/").unwrap();
        assert_eq!(
            endpoint(Some(&base), "https://api.openai.com/v1", "chat/completions"),
            "http://127.0.0.1:8080/v1/chat/completions"
        );
        assert_eq!(
            endpoint(None, "https://api.openai.com/v1", "chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn anthropic_requires_key() {
        let config = LlmConfig {
            provider_type: LlmProviderType::Anthropic,
            ..LlmConfig::default()
        };
        assert!(matches!(build_provider(&config), Err(LlmError::Config(_))));
    }

    #[test]
    fn builds_configured_provider() {
        assert_eq!(build_provider(&LlmConfig::default()).unwrap().name(), "openai");

        let config = LlmConfig {
            provider_type: LlmProviderType::Anthropic,
            api_key: Some(secrecy::SecretString::from("sk-ant".to_owned())),
            ..LlmConfig::default()
        };
        assert_eq!(build_provider(&config).unwrap().name(), "anthropic");
    }
}
