use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use thiserror::Error;

/// Maximum characters allowed in a single spoken line
pub const MAX_LINE_CHARS: usize = 1000;

/// One of the two voices in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Speaker {
    /// Leads the conversation and explains the article
    Host,
    /// Asks questions and reacts
    Guest,
}

impl Speaker {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Guest => "guest",
        }
    }

    /// Parse a raw speaker label, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::iter().find(|speaker| speaker.as_str().eq_ignore_ascii_case(raw))
    }
}

/// Structural role of a line; declaration order is the required order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Section {
    Opening,
    CoreExplanation,
    Elaboration,
    InteractiveExchange,
    Closing,
}

impl Section {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::CoreExplanation => "core-explanation",
            Self::Elaboration => "elaboration",
            Self::InteractiveExchange => "interactive-exchange",
            Self::Closing => "closing",
        }
    }

    /// Zero-based position in the canonical ordering
    pub const fn position(self) -> usize {
        self as usize
    }
}

/// Raised when a section tag is not one of the five canonical tags
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown section tag: {0:?}")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    /// Accepts `core-explanation`, `core_explanation`, `Core Explanation` and similar
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c.to_ascii_lowercase() })
            .collect();

        Self::iter()
            .find(|section| section.as_str() == normalized)
            .ok_or_else(|| UnknownSection(raw.to_owned()))
    }
}

/// Dialogue line as produced by the language model, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    /// 1-based position in the script
    pub index: u32,
    /// Raw speaker label, checked by the validator
    pub speaker: String,
    /// Spoken text
    pub text: String,
    /// Structural role
    pub section: Section,
}

/// Validated dialogue line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub index: u32,
    pub speaker: Speaker,
    pub text: String,
    pub section: Section,
}

/// Parameters the script was generated with, echoed for reproducibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Configured language-model provider name
    pub provider: String,
    /// Model identifier
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Version tag of the system instructions
    pub prompt_version: String,
}

/// Identifier shared by every artifact of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Longest slug kept from the title
    const MAX_SLUG: usize = 48;

    /// Derive an identifier from a document title and a generation time
    ///
    /// The time is kept to the millisecond so runs started within the same
    /// second get distinct identifiers.
    pub fn derive(title: &str, at: Timestamp) -> Self {
        let mut slug = String::with_capacity(title.len());
        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
            if slug.len() >= Self::MAX_SLUG {
                break;
            }
        }
        let slug = slug.trim_end_matches('-');
        let slug = if slug.is_empty() { "untitled" } else { slug };

        Self(format!("{slug}-{}", at.strftime("%Y%m%d%H%M%S%3f")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RunId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated two-voice script
///
/// Only the validator constructs this; holders may rely on every structural
/// rule having been checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Run identifier derived from title and generation time
    pub id: RunId,
    /// Title of the source document
    pub title: String,
    /// Reference of the source document
    pub source_url: String,
    /// Lines in playback order
    pub lines: Vec<ScriptLine>,
    /// Line indices carrying each section tag
    pub sections: BTreeMap<Section, Vec<u32>>,
    /// Whitespace token count across all lines
    pub total_words: usize,
    /// `round(total_words / 150 * 60)`
    pub estimated_duration_secs: u32,
    pub params: GenerationParams,
    pub created_at: Timestamp,
}

impl Script {
    /// Indices of the lines tagged with `section`
    pub fn lines_in(&self, section: Section) -> &[u32] {
        self.sections.get(&section).map_or(&[], Vec::as_slice)
    }
}
