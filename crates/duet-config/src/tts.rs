use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Speech synthesis provider configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Provider type
    #[serde(rename = "type", default)]
    pub provider_type: TtsProviderType,
    /// API key
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model identifier, provider specific
    #[serde(default)]
    pub model: Option<String>,
    /// Encoding requested for each segment
    #[serde(default = "default_response_format")]
    pub response_format: String,
    /// Playback speed multiplier
    #[serde(default)]
    pub speed: Option<f64>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider_type: TtsProviderType::default(),
            api_key: None,
            base_url: None,
            model: None,
            response_format: default_response_format(),
            speed: None,
        }
    }
}

/// Supported TTS providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsProviderType {
    /// `OpenAI` TTS
    #[default]
    OpenaiTts,
    /// `ElevenLabs`
    Elevenlabs,
}

/// Fixed voice identity for each of the two speakers
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceConfig {
    #[serde(default = "default_host_voice")]
    pub host: String,
    #[serde(default = "default_guest_voice")]
    pub guest: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            host: default_host_voice(),
            guest: default_guest_voice(),
        }
    }
}

fn default_response_format() -> String {
    "mp3".to_string()
}

fn default_host_voice() -> String {
    "nova".to_string()
}

fn default_guest_voice() -> String {
    "onyx".to_string()
}
