pub mod elevenlabs;
pub mod openai_tts;

use async_trait::async_trait;

use crate::types::{SpeechRequest, SpeechResponse};

/// Trait for TTS provider implementations
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Synthesize text to speech
    async fn synthesize(&self, request: SpeechRequest) -> crate::error::Result<SpeechResponse>;

    /// Get the provider name
    fn name(&self) -> &str;

    /// Extension of the files this provider's audio should be stored under
    fn file_extension(&self) -> &str;
}

/// Read a successful response body, rejecting empty audio
async fn read_audio(response: reqwest::Response, provider: &str) -> crate::error::Result<SpeechResponse> {
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("audio/mpeg")
        .to_string();

    let audio = response.bytes().await.map_err(|e| {
        tracing::error!(provider, error = %e, "failed to read TTS response body");
        crate::error::TtsError::ConnectionError(format!("failed to read response body: {e}"))
    })?;

    if audio.is_empty() {
        return Err(crate::error::TtsError::EmptyAudio);
    }

    tracing::debug!(provider, bytes = audio.len(), "TTS synthesis complete");

    Ok(SpeechResponse {
        audio: audio.to_vec(),
        content_type,
    })
}
