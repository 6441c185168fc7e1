//! Article-to-conversation pipeline
//!
//! Turns a source article into a validated two-voice script, renders each
//! line with a speech provider, and stitches the clips into one normalized
//! audio file. [`Orchestrator`] drives the four stages in order.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod script;
pub mod stitcher;
pub mod store;
pub mod synthesis;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use error::PipelineError;
pub use orchestrator::{
    ArtifactPaths, GenerationMetadata, Orchestrator, OrchestratorBuilder, Outcome, PIPELINE_VERSION,
    PipelineResult, SourceReference, StageRecord,
};
pub use progress::{CallbackObserver, LogObserver, ProgressObserver};
pub use script::{ScriptError, ScriptWriter};
pub use stitcher::{AudioStitcher, StitchError};
pub use store::{ArtifactStore, StoreError};
pub use synthesis::{SegmentSynthesizer, SynthesisError};
pub use validator::{ScriptMeta, ScriptViolation, Validator, validate};
