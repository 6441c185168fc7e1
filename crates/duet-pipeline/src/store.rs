//! Durable per-run artifact layout
//!
//! ```text
//! <root>/<run_id>/
//!     script.json
//!     segments/line_001_host.mp3 ...
//!     scratch/
//!     conversation.mp3
//!     metadata.json
//!     result.json
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use duet_core::{RunId, Script, Speaker};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::orchestrator::{GenerationMetadata, PipelineResult};

const SCRIPT_FILE: &str = "script.json";
const METADATA_FILE: &str = "metadata.json";
const RESULT_FILE: &str = "result.json";
const SEGMENTS_DIR: &str = "segments";
const SCRATCH_DIR: &str = "scratch";
const AUDIO_STEM: &str = "conversation";

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another run already owns this identifier
    #[error("run {0} already exists")]
    RunExists(RunId),

    #[error("no artifact {file} for run {run_id}")]
    NotFound { run_id: RunId, file: &'static str },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Filesystem store keyed by run identifier
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.root.join(run_id.as_str())
    }

    pub fn segments_dir(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(SEGMENTS_DIR)
    }

    pub fn scratch_dir(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(SCRATCH_DIR)
    }

    /// `segments/line_NNN_<speaker>.<ext>`
    pub fn segment_path(&self, run_id: &RunId, line_index: u32, speaker: Speaker, extension: &str) -> PathBuf {
        self.segments_dir(run_id)
            .join(format!("line_{line_index:03}_{}.{extension}", speaker.as_str()))
    }

    pub fn audio_path(&self, run_id: &RunId, extension: &str) -> PathBuf {
        self.run_dir(run_id).join(format!("{AUDIO_STEM}.{extension}"))
    }

    pub fn script_path(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(SCRIPT_FILE)
    }

    pub fn metadata_path(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(METADATA_FILE)
    }

    pub fn result_path(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(RESULT_FILE)
    }

    /// Claim the run directory and create its segment and scratch directories
    ///
    /// Fails with [`StoreError::RunExists`] if the directory is already
    /// present, so two runs never share paths.
    pub async fn prepare_run(&self, run_id: &RunId) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;

        let run_dir = self.run_dir(run_id);
        match tokio::fs::create_dir(&run_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(StoreError::RunExists(run_id.clone())),
            Err(e) => return Err(StoreError::io(&run_dir, e)),
        }

        for dir in [self.segments_dir(run_id), self.scratch_dir(run_id)] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| StoreError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Drop every segment of a run and recreate the empty directory
    pub async fn reset_segments(&self, run_id: &RunId) -> Result<(), StoreError> {
        let dir = self.segments_dir(run_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(&dir, e)),
        }
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))
    }

    /// Remove a run's segments, logging instead of failing
    pub async fn discard_segments(&self, run_id: &RunId) {
        let dir = self.segments_dir(run_id);
        if let Err(e) = tokio::fs::remove_dir_all(&dir).await
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!(run_id = %run_id, path = %dir.display(), error = %e, "failed to discard segments");
        }
    }

    /// Remove a run's stitched audio and result record, logging instead of failing
    pub async fn discard_outputs(&self, run_id: &RunId, audio: &Path) {
        for path in [audio.to_path_buf(), self.result_path(run_id)] {
            if let Err(e) = tokio::fs::remove_file(&path).await
                && e.kind() != ErrorKind::NotFound
            {
                tracing::warn!(run_id = %run_id, path = %path.display(), error = %e, "failed to discard output");
            }
        }
    }

    pub async fn save_script(&self, script: &Script) -> Result<PathBuf, StoreError> {
        let path = self.script_path(&script.id);
        write_json(&path, script).await?;
        Ok(path)
    }

    pub async fn load_script(&self, run_id: &RunId) -> Result<Script, StoreError> {
        read_json(run_id, SCRIPT_FILE, &self.script_path(run_id)).await
    }

    pub async fn save_metadata(&self, metadata: &GenerationMetadata) -> Result<PathBuf, StoreError> {
        let path = self.metadata_path(&metadata.run_id);
        write_json(&path, metadata).await?;
        Ok(path)
    }

    pub async fn load_metadata(&self, run_id: &RunId) -> Result<GenerationMetadata, StoreError> {
        read_json(run_id, METADATA_FILE, &self.metadata_path(run_id)).await
    }

    pub async fn save_result(&self, result: &PipelineResult) -> Result<PathBuf, StoreError> {
        let path = self.result_path(&result.run_id);
        write_json(&path, result).await?;
        Ok(path)
    }

    pub async fn load_result(&self, run_id: &RunId) -> Result<PipelineResult, StoreError> {
        read_json(run_id, RESULT_FILE, &self.result_path(run_id)).await
    }
}

async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    tokio::fs::write(path, body).await.map_err(|e| StoreError::io(path, e))
}

async fn read_json<T: DeserializeOwned>(run_id: &RunId, file: &'static str, path: &Path) -> Result<T, StoreError> {
    let body = match tokio::fs::read(path).await {
        Ok(body) => body,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StoreError::NotFound {
                run_id: run_id.clone(),
                file,
            });
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    serde_json::from_slice(&body).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
