use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Article fetched from the content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Canonical article title
    pub title: String,
    /// Canonical reference to the article
    pub url: String,
    /// Cleaned plain-text body
    pub text: String,
    /// Whitespace-delimited token count of `text`
    pub word_count: usize,
    /// When the article was fetched
    pub fetched_at: Timestamp,
}

impl SourceDocument {
    /// Build a document, deriving the word count from the body
    pub fn new(title: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            title: title.into(),
            url: url.into(),
            word_count: crate::word_count(&text),
            text,
            fetched_at: Timestamp::now(),
        }
    }
}
