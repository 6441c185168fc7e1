use serde::{Deserialize, Serialize};
use strum::Display;

/// Failure classes an outer layer must be able to tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller-supplied title or reference is malformed
    InvalidInput,
    ContentNotFound,
    ContentTooShort,
    UnsupportedSourceLanguage,
    /// Validator rejection or malformed model output
    ScriptGenerationFailed,
    /// Synthesis still failing after the retry budget
    SpeechSynthesisFailed,
    /// Audio tool missing or erroring
    AudioStitchFailed,
    /// Transient collaborator outage
    ServiceUnavailable,
    Internal,
}

/// Implemented by every domain error in the workspace
///
/// Callers such as an HTTP layer translate errors through the category
/// instead of matching on message text.
pub trait Categorize: std::error::Error {
    fn category(&self) -> ErrorCategory;
}
