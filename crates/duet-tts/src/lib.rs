#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod http_client;
mod provider;
mod types;

use std::sync::Arc;

use duet_config::{TtsConfig, TtsProviderType};
use secrecy::{ExposeSecret, SecretString};

pub use error::{Result, TtsError};
pub use provider::{TtsProvider, elevenlabs::ElevenLabsProvider, openai_tts::OpenAiTtsProvider};
pub use types::{SpeechRequest, SpeechResponse};

/// Build the configured speech provider
pub fn build_provider(config: &TtsConfig) -> Result<Arc<dyn TtsProvider>> {
    let api_key = resolve_api_key(config)?;

    let provider: Arc<dyn TtsProvider> = match config.provider_type {
        TtsProviderType::OpenaiTts => Arc::new(OpenAiTtsProvider::new(api_key, config)),
        TtsProviderType::Elevenlabs => Arc::new(ElevenLabsProvider::new(api_key, config)),
    };

    tracing::debug!(provider = provider.name(), "TTS provider initialized");

    Ok(provider)
}

fn resolve_api_key(config: &TtsConfig) -> Result<SecretString> {
    config
        .api_key
        .clone()
        .filter(|key| !key.expose_secret().is_empty())
        .ok_or_else(|| TtsError::ConfigError("API key required for TTS provider".to_string()))
}
