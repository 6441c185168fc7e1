use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Script-writing model configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider type
    #[serde(rename = "type", default)]
    pub provider_type: LlmProviderType,
    /// API key
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model identifier sent with every completion
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_type: LlmProviderType::default(),
            api_key: None,
            base_url: None,
            model: default_model(),
            temperature: None,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderType {
    /// `OpenAI` or any compatible `/chat/completions` endpoint
    #[default]
    Openai,
    /// Anthropic Messages API
    Anthropic,
}

impl LlmProviderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[allow(clippy::unnecessary_wraps)]
const fn default_max_tokens() -> Option<u32> {
    Some(4096)
}
