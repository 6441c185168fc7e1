use duet_config::SourceConfig;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::error::{Result, SourceError};

/// Longest title MediaWiki accepts, in bytes
const MAX_TITLE_BYTES: usize = 255;

/// Characters MediaWiki never allows inside a page title
const FORBIDDEN_TITLE_CHARS: &[char] = &['#', '<', '>', '[', ']', '{', '}', '|'];

/// How the caller-supplied input should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InputKind {
    /// Bare article title in the default language
    Title,
    /// Full article URL
    Url,
}

impl InputKind {
    /// Guess the kind from the input's shape
    pub fn detect(input: &str) -> Self {
        let trimmed = input.trim_start();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url
        } else {
            Self::Title
        }
    }
}

/// Validated request for one article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    /// Article title with underscores turned into spaces
    pub title: String,
    /// Wikipedia language edition, e.g. `en`
    pub language: String,
    /// Reference the caller supplied, when the input was a URL
    pub reference: Option<Url>,
}

impl DocumentQuery {
    /// Parse caller input before the pipeline starts
    ///
    /// `kind` overrides detection; `None` treats `http(s)://` input as a URL.
    pub fn parse(input: &str, kind: Option<InputKind>, config: &SourceConfig) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SourceError::InvalidInput("input must not be empty".to_string()));
        }

        let query = match kind.unwrap_or_else(|| InputKind::detect(input)) {
            InputKind::Title => Self {
                title: normalize_title(input)?,
                language: config.default_language.clone(),
                reference: None,
            },
            InputKind::Url => Self::from_url(input)?,
        };

        if !config.languages.iter().any(|lang| lang == &query.language) {
            return Err(SourceError::UnsupportedLanguage {
                language: query.language,
            });
        }

        Ok(query)
    }

    fn from_url(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| SourceError::InvalidInput(format!("malformed URL '{input}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SourceError::InvalidInput(format!("unsupported URL scheme '{}'", url.scheme())));
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let Some(prefix) = host.strip_suffix(".wikipedia.org") else {
            return Err(SourceError::InvalidInput(format!("'{host}' is not a Wikipedia host")));
        };

        // `en.m.wikipedia.org` is the mobile edition of `en`
        let language = prefix.split('.').next().unwrap_or_default();
        if language.is_empty() || language == "www" {
            return Err(SourceError::InvalidInput(format!("'{host}' does not name a language edition")));
        }

        let Some(raw_title) = url.path().strip_prefix("/wiki/") else {
            return Err(SourceError::InvalidInput(format!("'{}' is not an article path", url.path())));
        };

        let decoded = urlencoding::decode(raw_title)
            .map_err(|e| SourceError::InvalidInput(format!("article title is not valid UTF-8: {e}")))?;

        Ok(Self {
            title: normalize_title(&decoded)?,
            language: language.to_string(),
            reference: Some(url),
        })
    }

    /// Canonical article URL for this query
    pub fn canonical_url(&self) -> String {
        format!(
            "https://{}.wikipedia.org/wiki/{}",
            self.language,
            urlencoding::encode(&self.title.replace(' ', "_"))
        )
    }
}

fn normalize_title(raw: &str) -> Result<String> {
    let title = raw.replace('_', " ").split_whitespace().collect::<Vec<_>>().join(" ");

    if title.is_empty() {
        return Err(SourceError::InvalidInput("article title must not be empty".to_string()));
    }

    if title.len() > MAX_TITLE_BYTES {
        return Err(SourceError::InvalidInput(format!(
            "article title exceeds {MAX_TITLE_BYTES} bytes"
        )));
    }

    if let Some(c) = title.chars().find(|c| FORBIDDEN_TITLE_CHARS.contains(c)) {
        return Err(SourceError::InvalidInput(format!("article title contains forbidden character '{c}'")));
    }

    Ok(title)
}
