use duet_core::{Categorize, ErrorCategory};
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure or upstream server error
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Provider rejected the request as malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider rejected the configured credentials
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error("rate limit exceeded")]
    RateLimited,

    /// Provider answered with a body that does not match its wire format
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Provider could not be built from configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Map a non-success HTTP status to an error
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(body),
            400 | 404 | 422 => Self::InvalidRequest(body),
            429 => Self::RateLimited,
            _ => Self::Upstream(format!("provider returned {status}: {body}")),
        }
    }

    /// Whether the failure is likely transient
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::RateLimited)
    }
}

impl Categorize for LlmError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Upstream(_) | Self::RateLimited => ErrorCategory::ServiceUnavailable,
            Self::InvalidRequest(_) | Self::InvalidResponse(_) => ErrorCategory::ScriptGenerationFailed,
            Self::Unauthorized(_) | Self::Config(_) => ErrorCategory::Internal,
        }
    }
}
