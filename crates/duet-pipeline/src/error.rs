use duet_core::{Categorize, ErrorCategory};
use duet_source::SourceError;
use thiserror::Error;

use crate::script::ScriptError;
use crate::stitcher::StitchError;
use crate::store::StoreError;
use crate::synthesis::SynthesisError;

/// Failure of a generation run, wrapping the error of the stage that failed
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller input rejected before any stage ran
    #[error(transparent)]
    Input(SourceError),

    #[error(transparent)]
    Fetch(SourceError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    /// Run artifacts could not be written or read
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A collaborator could not be built from configuration
    #[error("pipeline configuration error: {0}")]
    Config(String),
}

impl Categorize for PipelineError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Input(e) | Self::Fetch(e) => e.category(),
            Self::Script(e) => e.category(),
            Self::Synthesis(e) => e.category(),
            Self::Stitch(e) => e.category(),
            Self::Store(_) | Self::Config(_) => ErrorCategory::Internal,
        }
    }
}
