use duet_core::{Categorize, ErrorCategory};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors raised while resolving or fetching a source document
#[derive(Debug, Error)]
pub enum SourceError {
    /// Title or reference is malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reference points at a language edition that is not accepted
    #[error("unsupported source language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("article not found: {title}")]
    NotFound { title: String },

    /// Article body is below the configured minimum
    #[error("article '{title}' is too short ({words} words, need at least {min})")]
    TooShort { title: String, words: usize, min: usize },

    /// Transport failure or upstream outage
    #[error("content source unavailable: {0}")]
    Unavailable(String),

    /// Upstream answered with a body that could not be interpreted
    #[error("unexpected response from content source: {0}")]
    UnexpectedResponse(String),
}

impl Categorize for SourceError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) => ErrorCategory::InvalidInput,
            Self::UnsupportedLanguage { .. } => ErrorCategory::UnsupportedSourceLanguage,
            Self::NotFound { .. } => ErrorCategory::ContentNotFound,
            Self::TooShort { .. } => ErrorCategory::ContentTooShort,
            Self::Unavailable(_) => ErrorCategory::ServiceUnavailable,
            Self::UnexpectedResponse(_) => ErrorCategory::Internal,
        }
    }
}
