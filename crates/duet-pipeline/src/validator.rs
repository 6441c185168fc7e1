//! Structural contract for generated dialogue
//!
//! Rules run in a fixed order and the first violation wins:
//!
//! 1. at least [`MIN_LINES`] lines
//! 2. every section tag present
//! 3. every speaker is `host` or `guest`
//! 4. section positions never decrease
//! 5. no more than [`MAX_SPEAKER_RUN`] consecutive lines per speaker
//!
//! Lines must also be numbered `1..=n` in order and stay within
//! [`MAX_LINE_CHARS`]; segment file names rely on both.

use std::collections::BTreeMap;

use duet_config::{DurationPolicy, ScriptConfig};
use duet_core::{DraftLine, GenerationParams, MAX_LINE_CHARS, RunId, Script, ScriptLine, Section, Speaker};
use jiff::Timestamp;
use strum::IntoEnumIterator;
use thiserror::Error;

pub const MIN_LINES: usize = 10;
pub const MAX_SPEAKER_RUN: usize = 5;
/// Fixed speaking rate used for duration estimates
pub const WORDS_PER_MINUTE: f64 = 150.0;

/// First rule a draft script breaks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptViolation {
    #[error("script must have at least {MIN_LINES} lines (got {count})")]
    TooShort { count: usize },

    #[error("script is missing section '{section}'")]
    MissingSection { section: Section },

    #[error("line {line} has invalid speaker '{speaker}'")]
    InvalidSpeaker { line: u32, speaker: String },

    #[error("line {line} is tagged '{section}' after a '{previous}' line")]
    SectionOrder {
        line: u32,
        section: Section,
        previous: Section,
    },

    #[error(
        "too many consecutive lines from {speaker} starting at line {start} (limit {MAX_SPEAKER_RUN}, exceeded at line {line})"
    )]
    SpeakerRun { speaker: Speaker, start: u32, line: u32 },

    #[error("line at position {position} is numbered {index}")]
    IndexOutOfSequence { position: u32, index: u32 },

    #[error("line {line} has {chars} characters (limit {MAX_LINE_CHARS})")]
    LineTooLong { line: u32, chars: usize },

    #[error("estimated duration {estimated}s is outside {min}-{max}s")]
    DurationOutOfRange { estimated: u32, min: u32, max: u32 },
}

/// Provenance attached to a validated script
#[derive(Debug, Clone)]
pub struct ScriptMeta {
    pub title: String,
    pub source_url: String,
    pub params: GenerationParams,
    /// Generation time; also feeds the run identifier
    pub created_at: Timestamp,
}

/// Script validator with a configurable duration window
#[derive(Debug, Clone)]
pub struct Validator {
    min_duration_secs: u32,
    max_duration_secs: u32,
    policy: DurationPolicy,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ScriptConfig::default())
    }
}

impl Validator {
    pub const fn new(config: &ScriptConfig) -> Self {
        Self {
            min_duration_secs: config.min_duration_secs,
            max_duration_secs: config.max_duration_secs,
            policy: config.duration_policy,
        }
    }

    /// Turn draft lines into a [`Script`] or name the first broken rule
    pub fn validate(&self, lines: Vec<DraftLine>, meta: ScriptMeta) -> Result<Script, ScriptViolation> {
        check_length(&lines)?;
        check_sections_present(&lines)?;
        let speakers = check_speakers(&lines)?;
        check_section_order(&lines)?;
        check_speaker_runs(&lines, &speakers)?;
        check_indices(&lines)?;
        check_line_lengths(&lines)?;

        let total_words: usize = lines.iter().map(|line| duet_core::word_count(&line.text)).sum();
        let estimated_duration_secs = estimate_duration_secs(total_words);
        self.check_duration(estimated_duration_secs)?;

        let mut sections: BTreeMap<Section, Vec<u32>> = BTreeMap::new();
        let lines: Vec<ScriptLine> = lines
            .into_iter()
            .zip(speakers)
            .map(|(line, speaker)| {
                sections.entry(line.section).or_default().push(line.index);
                ScriptLine {
                    index: line.index,
                    speaker,
                    text: line.text,
                    section: line.section,
                }
            })
            .collect();

        Ok(Script {
            id: RunId::derive(&meta.title, meta.created_at),
            title: meta.title,
            source_url: meta.source_url,
            lines,
            sections,
            total_words,
            estimated_duration_secs,
            params: meta.params,
            created_at: meta.created_at,
        })
    }

    fn check_duration(&self, estimated: u32) -> Result<(), ScriptViolation> {
        if (self.min_duration_secs..=self.max_duration_secs).contains(&estimated) {
            return Ok(());
        }

        match self.policy {
            DurationPolicy::Warn => {
                tracing::warn!(
                    estimated_secs = estimated,
                    min_secs = self.min_duration_secs,
                    max_secs = self.max_duration_secs,
                    "script duration outside target window"
                );
                Ok(())
            }
            DurationPolicy::Reject => Err(ScriptViolation::DurationOutOfRange {
                estimated,
                min: self.min_duration_secs,
                max: self.max_duration_secs,
            }),
        }
    }
}

/// Validate with the default duration window, which only warns
pub fn validate(lines: Vec<DraftLine>, meta: ScriptMeta) -> Result<Script, ScriptViolation> {
    Validator::default().validate(lines, meta)
}

/// `round(total_words / 150 * 60)`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn estimate_duration_secs(total_words: usize) -> u32 {
    (total_words as f64 / WORDS_PER_MINUTE * 60.0).round() as u32
}

fn check_length(lines: &[DraftLine]) -> Result<(), ScriptViolation> {
    if lines.len() < MIN_LINES {
        return Err(ScriptViolation::TooShort { count: lines.len() });
    }
    Ok(())
}

fn check_sections_present(lines: &[DraftLine]) -> Result<(), ScriptViolation> {
    for section in Section::iter() {
        if !lines.iter().any(|line| line.section == section) {
            return Err(ScriptViolation::MissingSection { section });
        }
    }
    Ok(())
}

fn check_speakers(lines: &[DraftLine]) -> Result<Vec<Speaker>, ScriptViolation> {
    lines
        .iter()
        .map(|line| {
            Speaker::parse(&line.speaker).ok_or_else(|| ScriptViolation::InvalidSpeaker {
                line: line.index,
                speaker: line.speaker.clone(),
            })
        })
        .collect()
}

fn check_section_order(lines: &[DraftLine]) -> Result<(), ScriptViolation> {
    for pair in lines.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.section.position() < previous.section.position() {
            return Err(ScriptViolation::SectionOrder {
                line: current.index,
                section: current.section,
                previous: previous.section,
            });
        }
    }
    Ok(())
}

fn check_speaker_runs(lines: &[DraftLine], speakers: &[Speaker]) -> Result<(), ScriptViolation> {
    let mut run_start = 0;

    for position in 1..=speakers.len() {
        if position < speakers.len() && speakers[position] == speakers[run_start] {
            continue;
        }

        if position - run_start > MAX_SPEAKER_RUN {
            return Err(ScriptViolation::SpeakerRun {
                speaker: speakers[run_start],
                start: lines[run_start].index,
                line: lines[run_start + MAX_SPEAKER_RUN].index,
            });
        }
        run_start = position;
    }

    Ok(())
}

fn check_indices(lines: &[DraftLine]) -> Result<(), ScriptViolation> {
    for (line, position) in lines.iter().zip(1u32..) {
        if line.index != position {
            return Err(ScriptViolation::IndexOutOfSequence {
                position,
                index: line.index,
            });
        }
    }
    Ok(())
}

fn check_line_lengths(lines: &[DraftLine]) -> Result<(), ScriptViolation> {
    for line in lines {
        let chars = line.text.chars().count();
        if chars > MAX_LINE_CHARS {
            return Err(ScriptViolation::LineTooLong { line: line.index, chars });
        }
    }
    Ok(())
}
