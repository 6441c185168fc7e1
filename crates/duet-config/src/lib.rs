#![allow(clippy::must_use_candidate)]

pub mod audio;
mod env;
pub mod llm;
mod loader;
pub mod output;
pub mod script;
pub mod source;
pub mod synthesis;
pub mod telemetry;
pub mod tts;

use serde::Deserialize;

pub use audio::*;
pub use env::ExpandError;
pub use llm::*;
pub use output::*;
pub use script::*;
pub use source::*;
pub use synthesis::*;
pub use telemetry::{ExportProtocol, ExporterConfig, LogFormat, TelemetryConfig};
pub use tts::*;

/// Top-level Duet configuration
///
/// Built once at startup and handed to the orchestrator; no stage reads
/// configuration from anywhere else.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Content source configuration
    #[serde(default)]
    pub source: SourceConfig,
    /// Script-writing language model
    #[serde(default)]
    pub llm: LlmConfig,
    /// Speech synthesis provider
    #[serde(default)]
    pub tts: TtsConfig,
    /// Voice assigned to each speaker
    #[serde(default)]
    pub voices: VoiceConfig,
    /// Synthesis retry and concurrency policy
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Audio tool and output format
    #[serde(default)]
    pub audio: AudioConfig,
    /// Script duration policy
    #[serde(default)]
    pub script: ScriptConfig,
    /// Artifact output location
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging and trace export
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
