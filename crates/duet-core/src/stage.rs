use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::script::RunId;

/// The four sequential phases of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StageName {
    ContentFetch,
    ScriptGeneration,
    SpeechSynthesis,
    AudioStitch,
}

impl StageName {
    /// All stages in execution order
    pub fn ordered() -> Vec<Self> {
        Self::iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StageStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Status record of one stage within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub name: StageName,
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineStage {
    pub const fn pending(name: StageName) -> Self {
        Self {
            name,
            status: StageStatus::Pending,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Wall-clock milliseconds between start and finish, once both are known
    #[allow(clippy::cast_possible_truncation)]
    pub fn elapsed_ms(&self) -> Option<i64> {
        let started = self.started_at?;
        let finished = self.finished_at?;
        Some(finished.duration_since(started).as_millis() as i64)
    }
}

/// Stage transition published to progress observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Known once the script has been generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    pub stage: StageName,
    pub status: StageStatus,
    /// Human-readable description of the transition
    pub message: String,
    pub at: Timestamp,
}
