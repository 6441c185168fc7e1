//! Script drafting through the configured language model

use std::sync::Arc;

use duet_config::{LlmConfig, ScriptConfig};
use duet_core::{Categorize, DraftLine, ErrorCategory, GenerationParams, MAX_LINE_CHARS, Script, Section, SourceDocument};
use duet_llm::{CompletionRequest, FinishReason, LlmError, Message, Provider};
use indoc::formatdoc;
use jiff::Timestamp;
use serde::Deserialize;
use thiserror::Error;

use crate::validator::{MAX_SPEAKER_RUN, MIN_LINES, ScriptMeta, ScriptViolation, Validator, WORDS_PER_MINUTE};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("language model returned no content")]
    EmptyResponse,

    /// Output is not the expected JSON shape
    #[error("malformed script output: {0}")]
    Malformed(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("script failed validation: {0}")]
    Invalid(#[from] ScriptViolation),
}

impl Categorize for ScriptError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Llm(e) => e.category(),
            Self::EmptyResponse | Self::Malformed(_) | Self::Invalid(_) => ErrorCategory::ScriptGenerationFailed,
        }
    }
}

/// Line shape the model is instructed to produce
#[derive(Debug, Deserialize)]
struct RawLine {
    speaker: String,
    section: String,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDraft {
    Wrapped { lines: Vec<RawLine> },
    Bare(Vec<RawLine>),
}

/// Drafts a conversation for a document and validates it
pub struct ScriptWriter {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    prompt_version: String,
    min_duration_secs: u32,
    max_duration_secs: u32,
    validator: Validator,
}

impl ScriptWriter {
    pub fn new(provider: Arc<dyn Provider>, llm: &LlmConfig, script: &ScriptConfig) -> Self {
        Self {
            provider,
            model: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            prompt_version: script.prompt_version.clone(),
            min_duration_secs: script.min_duration_secs,
            max_duration_secs: script.max_duration_secs,
            validator: Validator::new(script),
        }
    }

    /// Ask the model for a script and run it through the validator
    pub async fn write(&self, document: &SourceDocument) -> Result<Script, ScriptError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(self.instructions()),
                Message::user(article_message(document)),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_output: true,
        };

        let response = self.provider.complete(&request).await?;

        if response.finish_reason == Some(FinishReason::Length) {
            tracing::warn!(
                provider = self.provider.name(),
                model = %response.model,
                "script output hit the token limit"
            );
        }

        let raw = response
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or(ScriptError::EmptyResponse)?;

        let lines = parse_draft(&raw)?;
        tracing::debug!(title = %document.title, lines = lines.len(), "parsed draft script");

        let meta = ScriptMeta {
            title: document.title.clone(),
            source_url: document.url.clone(),
            params: GenerationParams {
                provider: self.provider.name().to_string(),
                model: self.model.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                prompt_version: self.prompt_version.clone(),
            },
            created_at: Timestamp::now(),
        };

        let script = self.validator.validate(lines, meta)?;

        tracing::info!(
            run_id = %script.id,
            lines = script.lines.len(),
            words = script.total_words,
            estimated_secs = script.estimated_duration_secs,
            "script generated"
        );

        Ok(script)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn instructions(&self) -> String {
        let words = |secs: u32| (f64::from(secs) * WORDS_PER_MINUTE / 60.0).round() as u32;
        let sections = [
            Section::Opening,
            Section::CoreExplanation,
            Section::Elaboration,
            Section::InteractiveExchange,
            Section::Closing,
        ]
        .map(Section::as_str)
        .join(", ");

        formatdoc! {r#"
            You write short educational conversations between two speakers, "host" and "guest".
            The host explains the article; the guest asks questions and reacts.

            Rules:
            - Write at least {min_lines} lines.
            - Tag every line with one section, using these sections in this order: {sections}.
            - Every section must appear at least once and sections never go back to an earlier one.
            - Never give more than {max_run} consecutive lines to the same speaker.
            - Keep each line under {max_chars} characters.
            - Aim for {min_words} to {max_words} words in total ({min_secs} to {max_secs} seconds at {wpm} words per minute).
            - Use only facts from the article.

            Respond with JSON only, in this exact shape:
            {{"lines": [{{"speaker": "host", "section": "opening", "text": "..."}}]}}
        "#,
            min_lines = MIN_LINES,
            max_run = MAX_SPEAKER_RUN,
            max_chars = MAX_LINE_CHARS,
            sections = sections,
            min_words = words(self.min_duration_secs),
            max_words = words(self.max_duration_secs),
            min_secs = self.min_duration_secs,
            max_secs = self.max_duration_secs,
            wpm = WORDS_PER_MINUTE,
        }
    }
}

fn article_message(document: &SourceDocument) -> String {
    formatdoc! {"
        Title: {title}
        Source: {url}

        {text}
    ",
        title = document.title,
        url = document.url,
        text = document.text,
    }
}

/// Parse model output into draft lines with 1-based indices
fn parse_draft(raw: &str) -> Result<Vec<DraftLine>, ScriptError> {
    let body = strip_code_fence(raw);

    let draft: RawDraft =
        serde_json::from_str(body).map_err(|e| ScriptError::Malformed(format!("invalid JSON: {e}")))?;
    let (RawDraft::Wrapped { lines } | RawDraft::Bare(lines)) = draft;

    lines
        .into_iter()
        .zip(1u32..)
        .map(|(line, index)| {
            let section: Section = line
                .section
                .parse()
                .map_err(|e| ScriptError::Malformed(format!("line {index}: {e}")))?;

            let text = line.text.trim();
            if text.is_empty() {
                return Err(ScriptError::Malformed(format!("line {index} has no text")));
            }
            let chars = text.chars().count();
            if chars > MAX_LINE_CHARS {
                return Err(ScriptError::Malformed(format!(
                    "line {index} has {chars} characters (limit {MAX_LINE_CHARS})"
                )));
            }

            Ok(DraftLine {
                index,
                speaker: line.speaker,
                text: text.to_string(),
                section,
            })
        })
        .collect()
}

/// Drop a surrounding Markdown code fence, with or without a language tag
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
