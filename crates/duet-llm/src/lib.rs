//! Language-model collaborator for Duet
//!
//! A small completion interface over `OpenAI`-compatible and Anthropic
//! endpoints, used to draft conversation scripts.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod protocol;
pub mod provider;
pub mod types;

pub use error::LlmError;
pub use provider::{Provider, build_provider};
pub use types::{CompletionRequest, CompletionResponse, FinishReason, Message, Role, Usage};
