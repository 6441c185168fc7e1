use duet_core::{Categorize, ErrorCategory};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Errors raised by speech synthesis providers
#[derive(Debug, Error)]
pub enum TtsError {
    /// Request never reached the provider
    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Provider rejected the text, voice or model
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("provider API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Provider answered successfully with no audio
    #[error("provider returned empty audio")]
    EmptyAudio,

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl TtsError {
    /// Map a non-success HTTP status to an error
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed(message),
            400 | 422 => Self::InvalidRequest(message),
            _ => Self::ProviderApiError { status, message },
        }
    }
}

impl Categorize for TtsError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::ConnectionError(_) => ErrorCategory::ServiceUnavailable,
            Self::ProviderApiError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorCategory::ServiceUnavailable
            }
            Self::ConfigError(_) | Self::InternalError(_) => ErrorCategory::Internal,
            _ => ErrorCategory::SpeechSynthesisFailed,
        }
    }
}
