use serde::Deserialize;
use url::Url;

/// Content source configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Override for the MediaWiki API endpoint; derived from the language otherwise
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Language used when the input is a bare title
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Wikipedia language editions accepted as input
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Articles with fewer words are rejected as too short
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    /// Article bodies are truncated to this many words
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    /// Sent as the `User-Agent` header, which MediaWiki requires
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_language: default_language(),
            languages: default_languages(),
            min_words: default_min_words(),
            max_words: default_max_words(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_languages() -> Vec<String> {
    vec![default_language()]
}

const fn default_min_words() -> usize {
    300
}

const fn default_max_words() -> usize {
    6000
}

fn default_user_agent() -> String {
    format!("duet/{}", env!("CARGO_PKG_VERSION"))
}
