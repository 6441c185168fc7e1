//! Domain model shared across the Duet workspace
//!
//! Every entity here is created once per generation run and never mutated
//! afterwards. Collaborator crates produce them, the pipeline consumes them.

#![allow(clippy::must_use_candidate)]

pub mod audio;
pub mod document;
pub mod error;
pub mod script;
pub mod stage;

pub use audio::{AudioFormat, AudioSegment, StitchedAudio};
pub use document::SourceDocument;
pub use error::{Categorize, ErrorCategory};
pub use script::{DraftLine, GenerationParams, MAX_LINE_CHARS, RunId, Script, ScriptLine, Section, Speaker};
pub use stage::{PipelineStage, ProgressEvent, StageName, StageStatus};

/// Count whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("  one\ttwo\nthree  four "), 4);
        assert_eq!(word_count(""), 0);
    }
}
