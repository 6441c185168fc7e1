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

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "tts-1";

/// `OpenAI` TTS provider
pub struct OpenAiTtsProvider {
    client: Client,
    speech_url: String,
    api_key: SecretString,
    model: String,
    response_format: String,
    speed: Option<f64>,
}

impl OpenAiTtsProvider {
    pub fn new(api_key: SecretString, config: &TtsConfig) -> Self {
        let base_url = config
            .base_url
            .as_ref()
            .map_or(DEFAULT_OPENAI_API_URL, url::Url::as_str)
            .trim_end_matches('/');

        Self {
            client: http_client(),
            speech_url: format!("{base_url}/audio/speech"),
            api_key,
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            response_format: config.response_format.clone(),
            speed: config.speed,
        }
    }
}

#[derive(serde::Serialize)]
struct OpenAiTtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
}

#[async_trait]
impl TtsProvider for OpenAiTtsProvider {
    async fn synthesize(&self, request: SpeechRequest) -> crate::error::Result<SpeechResponse> {
        tracing::debug!(
            model = %self.model,
            voice = %request.voice,
            input_len = request.input.len(),
            "OpenAI TTS request"
        );

        let body = OpenAiTtsRequest {
            model: &self.model,
            input: &request.input,
            voice: &request.voice,
            response_format: &self.response_format,
            speed: self.speed,
        };

        let response = self
            .client
            .post(&self.speech_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "OpenAI TTS request failed");
                TtsError::ConnectionError(format!("failed to send request to OpenAI TTS: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            tracing::error!(status = %status, error = %error_text, "OpenAI TTS API error");
            return Err(TtsError::from_status(status.as_u16(), error_text));
        }

        super::read_audio(response, self.name()).await
    }

    fn name(&self) -> &'static str {
        "openai_tts"
    }

    fn file_extension(&self) -> &str {
        &self.response_format
    }
}
