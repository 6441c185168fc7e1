//! Concatenation and loudness normalization through `ffmpeg`

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use duet_config::AudioConfig;
use duet_core::{AudioFormat, AudioSegment, Categorize, ErrorCategory, RunId, StitchedAudio};
use thiserror::Error;
use tokio::process::Command;

/// Substrings in `ffmpeg` stderr that mean the output cannot be trusted
const ERROR_MARKERS: &[&str] = &["Error", "Invalid data found"];

/// Lines of tool stderr kept in error details
const STDERR_TAIL_LINES: usize = 5;

#[derive(Debug, Error)]
pub enum StitchError {
    #[error("no audio segments to stitch")]
    NoSegments,

    #[error("{tool} is not available: {detail}")]
    ToolUnavailable { tool: String, detail: String },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg failed: {detail}")]
    ToolFailed { detail: String },

    #[error("could not determine duration of {}: {detail}", path.display())]
    Duration { path: PathBuf, detail: String },
}

impl StitchError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Categorize for StitchError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::AudioStitchFailed
    }
}

/// Joins segment files into one normalized audio file
#[derive(Debug, Clone)]
pub struct AudioStitcher {
    config: AudioConfig,
}

impl AudioStitcher {
    pub fn new(config: &AudioConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Format every stitched file is encoded with
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            codec: self.config.codec.clone(),
            bitrate_kbps: self.config.bitrate_kbps,
            sample_rate_hz: self.config.sample_rate_hz,
            channels: self.config.channels,
        }
    }

    pub fn extension(&self) -> &str {
        &self.config.extension
    }

    /// Concatenate `segments` in line order into `output`
    ///
    /// Both audio tools are checked before any file is touched. A failed
    /// encode removes whatever partial output was written.
    pub async fn stitch(
        &self,
        run_id: &RunId,
        segments: &[AudioSegment],
        scratch_dir: &Path,
        output: &Path,
    ) -> Result<StitchedAudio, StitchError> {
        if segments.is_empty() {
            return Err(StitchError::NoSegments);
        }

        check_tool(&self.config.ffmpeg_path).await?;
        check_tool(&self.config.ffprobe_path).await?;

        let mut ordered: Vec<&AudioSegment> = segments.iter().collect();
        ordered.sort_by_key(|segment| segment.line_index);

        let mut paths = Vec::with_capacity(ordered.len());
        for segment in ordered {
            let path = tokio::fs::canonicalize(&segment.path)
                .await
                .map_err(|e| StitchError::io(&segment.path, e))?;
            paths.push(path);
        }

        tokio::fs::create_dir_all(scratch_dir)
            .await
            .map_err(|e| StitchError::io(scratch_dir, e))?;
        let list_path = scratch_dir.join(format!("concat-{run_id}.txt"));
        tokio::fs::write(&list_path, concat_list(&paths))
            .await
            .map_err(|e| StitchError::io(&list_path, e))?;

        let result = self.encode_and_measure(&list_path, output).await;

        if let Err(e) = tokio::fs::remove_file(&list_path).await {
            tracing::warn!(run_id = %run_id, path = %list_path.display(), error = %e, "failed to remove concat list");
        }

        let stitched = result?;
        tracing::info!(
            run_id = %run_id,
            segments = segments.len(),
            duration_secs = stitched.duration_secs,
            bytes = stitched.byte_size,
            path = %stitched.path.display(),
            "audio stitched"
        );

        Ok(stitched)
    }

    async fn encode_and_measure(&self, list_path: &Path, output: &Path) -> Result<StitchedAudio, StitchError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .args(self.ffmpeg_args(list_path, output))
            .stdin(Stdio::null())
            .output()
            .await;

        let failure = match result {
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                if !out.status.success() {
                    Some(failure_detail(&stderr, &format!("exited with {}", out.status)))
                } else if ERROR_MARKERS.iter().any(|marker| stderr.contains(marker)) {
                    Some(failure_detail(&stderr, "reported an error"))
                } else {
                    None
                }
            }
            Err(e) => Some(format!("could not run {}: {e}", self.config.ffmpeg_path.display())),
        };

        if let Some(detail) = failure {
            remove_partial(output).await;
            return Err(StitchError::ToolFailed { detail });
        }

        let measured = self.measure(output).await;
        if measured.is_err() {
            remove_partial(output).await;
        }
        measured
    }

    /// Duration and size of an encoded file
    async fn measure(&self, output: &Path) -> Result<StitchedAudio, StitchError> {
        let duration_secs = self.read_duration(output).await?;
        let byte_size = tokio::fs::metadata(output)
            .await
            .map_err(|e| StitchError::io(output, e))?
            .len();

        Ok(StitchedAudio {
            path: output.to_path_buf(),
            duration_secs,
            byte_size,
        })
    }

    fn ffmpeg_args(&self, list_path: &Path, output: &Path) -> Vec<OsString> {
        let config = &self.config;
        let loudnorm = format!(
            "loudnorm=I={}:TP={}:LRA={}",
            config.target_loudness, config.true_peak, config.loudness_range
        );

        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y", "-f", "concat", "-safe", "0", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(list_path.as_os_str().to_owned());
        args.extend(
            [
                "-af".to_string(),
                loudnorm,
                "-c:a".to_string(),
                config.codec.clone(),
                "-b:a".to_string(),
                format!("{}k", config.bitrate_kbps),
                "-ar".to_string(),
                config.sample_rate_hz.to_string(),
                "-ac".to_string(),
                config.channels.to_string(),
            ]
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }

    async fn read_duration(&self, path: &Path) -> Result<f64, StitchError> {
        let duration_error = |detail: String| StitchError::Duration {
            path: path.to_path_buf(),
            detail,
        };

        let out = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| duration_error(e.to_string()))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(duration_error(failure_detail(&stderr, &format!("exited with {}", out.status))));
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        let raw = stdout.trim();
        raw.parse::<f64>()
            .ok()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .ok_or_else(|| duration_error(format!("unexpected duration output {raw:?}")))
    }
}

/// Run `<tool> -version` to confirm the executable works
async fn check_tool(path: &Path) -> Result<(), StitchError> {
    let tool = path.display().to_string();
    let status = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| StitchError::ToolUnavailable {
            tool: tool.clone(),
            detail: e.to_string(),
        })?;

    if !status.success() {
        return Err(StitchError::ToolUnavailable {
            tool,
            detail: format!("version check exited with {status}"),
        });
    }
    Ok(())
}

/// Concat demuxer input, one `file '<path>'` entry per segment
fn concat_list(paths: &[PathBuf]) -> String {
    paths.iter().fold(String::new(), |mut list, path| {
        let escaped = path.to_string_lossy().replace('\'', r"'\''");
        list.push_str("file '");
        list.push_str(&escaped);
        list.push_str("'\n");
        list
    })
}

fn failure_detail(stderr: &str, fallback: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
    if lines.is_empty() {
        return fallback.to_string();
    }
    lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("; ")
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output"),
    }
}
