//! Per-line speech synthesis with bounded concurrency and backoff retries

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use duet_config::{RetryScope, SynthesisConfig, VoiceConfig};
use duet_core::{AudioSegment, Categorize, ErrorCategory, RunId, ScriptLine, Speaker};
use duet_tts::{SpeechRequest, TtsError, TtsProvider};
use futures::{StreamExt, TryStreamExt, stream};
use jiff::Timestamp;
use thiserror::Error;

use crate::store::{ArtifactStore, StoreError};

#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Provider call for one line failed
    #[error("speech synthesis failed for line {index}: {source}")]
    Line {
        index: u32,
        #[source]
        source: TtsError,
    },

    #[error("failed to write segment {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Retry budget spent; `last` is the error of the final attempt
    #[error("speech synthesis failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<SynthesisError> },
}

impl Categorize for SynthesisError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Line { .. } | Self::Exhausted { .. } => ErrorCategory::SpeechSynthesisFailed,
            Self::Io { .. } | Self::Store(_) => ErrorCategory::Internal,
        }
    }
}

/// Renders script lines into audio segments on disk
pub struct SegmentSynthesizer {
    provider: Arc<dyn TtsProvider>,
    voices: VoiceConfig,
    store: ArtifactStore,
    config: SynthesisConfig,
}

impl SegmentSynthesizer {
    pub fn new(
        provider: Arc<dyn TtsProvider>,
        voices: &VoiceConfig,
        store: ArtifactStore,
        config: &SynthesisConfig,
    ) -> Self {
        Self {
            provider,
            voices: voices.clone(),
            store,
            config: config.clone(),
        }
    }

    fn voice_for(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Host => &self.voices.host,
            Speaker::Guest => &self.voices.guest,
        }
    }

    /// Synthesize every line once
    ///
    /// The first failing line aborts the batch; segments already written are
    /// left for the caller to discard. Returned segments are in line order
    /// whatever the configured concurrency.
    pub async fn synthesize(&self, run_id: &RunId, lines: &[ScriptLine]) -> Result<Vec<AudioSegment>, SynthesisError> {
        self.ensure_segments_dir(run_id).await?;

        let mut segments: Vec<AudioSegment> = stream::iter(lines)
            .map(|line| self.synthesize_line(run_id, line))
            .buffer_unordered(self.config.concurrency.max(1))
            .try_collect()
            .await?;

        segments.sort_by_key(|segment| segment.line_index);
        Ok(segments)
    }

    /// Synthesize all lines, retrying with exponential backoff
    ///
    /// Makes at most `max_retries + 1` attempts per retry unit (the whole
    /// batch or a single line, depending on the configured scope). A
    /// permanent failure removes every segment of the run.
    pub async fn synthesize_with_retry(
        &self,
        run_id: &RunId,
        lines: &[ScriptLine],
        max_retries: u32,
    ) -> Result<Vec<AudioSegment>, SynthesisError> {
        let result = match self.config.retry_scope {
            RetryScope::Batch => {
                self.retry(run_id, None, max_retries, move || async move {
                    self.store.reset_segments(run_id).await?;
                    self.synthesize(run_id, lines).await
                })
                .await
            }
            RetryScope::Line => self.synthesize_lines_with_retry(run_id, lines, max_retries).await,
        };

        match &result {
            Ok(segments) => {
                let total_bytes: u64 = segments.iter().map(|segment| segment.byte_size).sum();
                tracing::info!(run_id = %run_id, segments = segments.len(), total_bytes, "speech synthesis completed");
            }
            Err(e) => {
                tracing::error!(run_id = %run_id, error = %e, "speech synthesis failed permanently");
                self.store.discard_segments(run_id).await;
            }
        }

        result
    }

    async fn synthesize_lines_with_retry(
        &self,
        run_id: &RunId,
        lines: &[ScriptLine],
        max_retries: u32,
    ) -> Result<Vec<AudioSegment>, SynthesisError> {
        self.store.reset_segments(run_id).await?;

        let mut segments: Vec<AudioSegment> = stream::iter(lines)
            .map(|line| {
                self.retry(run_id, Some(line.index), max_retries, move || {
                    self.synthesize_line(run_id, line)
                })
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .try_collect()
            .await?;

        segments.sort_by_key(|segment| segment.line_index);
        Ok(segments)
    }

    async fn retry<T, F, Fut>(
        &self,
        run_id: &RunId,
        line: Option<u32>,
        max_retries: u32,
        mut operation: F,
    ) -> Result<T, SynthesisError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SynthesisError>>,
    {
        let attempts = max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(run_id = %run_id, line, attempt = attempt + 1, "speech synthesis recovered");
                    }
                    return Ok(value);
                }
                Err(e) if attempt < max_retries => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        run_id = %run_id,
                        line,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "speech synthesis attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(SynthesisError::Exhausted {
                        attempts,
                        last: Box::new(e),
                    });
                }
            }
        }
    }

    /// `base_delay_ms * 2^attempt`, attempt counted from zero
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.config.base_delay_ms.saturating_mul(factor))
    }

    async fn synthesize_line(&self, run_id: &RunId, line: &ScriptLine) -> Result<AudioSegment, SynthesisError> {
        let voice = self.voice_for(line.speaker);

        let response = self
            .provider
            .synthesize(SpeechRequest::new(line.text.as_str(), voice))
            .await
            .map_err(|source| SynthesisError::Line {
                index: line.index,
                source,
            })?;

        let path = self
            .store
            .segment_path(run_id, line.index, line.speaker, self.provider.file_extension());
        tokio::fs::write(&path, &response.audio)
            .await
            .map_err(|source| SynthesisError::Io {
                path: path.clone(),
                source,
            })?;

        let byte_size = response.audio.len() as u64;
        tracing::debug!(
            run_id = %run_id,
            line = line.index,
            speaker = %line.speaker,
            voice,
            bytes = byte_size,
            "segment synthesized"
        );

        Ok(AudioSegment {
            line_index: line.index,
            speaker: line.speaker,
            voice: voice.to_string(),
            path,
            byte_size,
            estimated_duration_secs: AudioSegment::estimate_duration(byte_size, self.config.assumed_bitrate_kbps),
            created_at: Timestamp::now(),
        })
    }

    async fn ensure_segments_dir(&self, run_id: &RunId) -> Result<(), SynthesisError> {
        let dir = self.store.segments_dir(run_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| SynthesisError::Io { path: dir, source })
    }
}
