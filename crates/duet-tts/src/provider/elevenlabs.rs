use async_trait::async_trait;
use duet_config::TtsConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::TtsError,
    http_client::http_client,
    types::{SpeechRequest, SpeechResponse},
};

use super::TtsProvider;

const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";
const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

/// `ElevenLabs` TTS provider
pub struct ElevenLabsProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    /// `ElevenLabs` `output_format`, e.g. `mp3_44100_128`; provider default when `None`
    output_format: Option<String>,
    extension: String,
}

impl ElevenLabsProvider {
    pub fn new(api_key: SecretString, config: &TtsConfig) -> Self {
        let base_url = config
            .base_url
            .as_ref()
            .map_or(DEFAULT_ELEVENLABS_API_URL, url::Url::as_str)
            .trim_end_matches('/')
            .to_string();

        // A bare codec name keeps the provider's default encoding for it
        let format = config.response_format.as_str();
        let output_format = format.contains('_').then(|| format.to_string());
        let extension = format.split('_').next().unwrap_or(format).to_string();

        Self {
            client: http_client(),
            base_url,
            api_key,
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            output_format,
            extension,
        }
    }
}

#[derive(serde::Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[async_trait]
impl TtsProvider for ElevenLabsProvider {
    async fn synthesize(&self, request: SpeechRequest) -> crate::error::Result<SpeechResponse> {
        let url = format!("{}/text-to-speech/{}", self.base_url, request.voice);

        tracing::debug!(
            model = %self.model,
            voice = %request.voice,
            input_len = request.input.len(),
            "ElevenLabs TTS request"
        );

        let body = ElevenLabsRequest {
            text: &request.input,
            model_id: &self.model,
        };

        let mut builder = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret())
            .json(&body);

        if let Some(format) = &self.output_format {
            builder = builder.query(&[("output_format", format.as_str())]);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, "ElevenLabs request failed");
            TtsError::ConnectionError(format!("failed to send request to ElevenLabs: {e}"))
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            tracing::error!(status = %status, error = %error_text, "ElevenLabs API error");
            return Err(TtsError::from_status(status.as_u16(), error_text));
        }

        super::read_audio(response, self.name()).await
    }

    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn file_extension(&self) -> &str {
        &self.extension
    }
}
