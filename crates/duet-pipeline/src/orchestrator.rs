//! Sequential four-stage generation run

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use duet_config::{Config, SourceConfig, VoiceConfig};
use duet_core::{
    AudioFormat, Categorize, ErrorCategory, GenerationParams, PipelineStage, ProgressEvent, RunId, Script, SourceDocument,
    Speaker, StageName, StageStatus,
};
use duet_llm::Provider;
use duet_source::{ContentSource, DocumentQuery, InputKind, WikipediaSource};
use duet_tts::TtsProvider;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::error::PipelineError;
use crate::progress::ProgressObserver;
use crate::script::ScriptWriter;
use crate::stitcher::AudioStitcher;
use crate::store::ArtifactStore;
use crate::synthesis::SegmentSynthesizer;

/// Version recorded in every result and metadata record
pub const PIPELINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of a successful run, persisted as `result.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: RunId,
    pub title: String,
    pub source_url: String,
    pub script_path: PathBuf,
    pub audio_path: PathBuf,
    /// Measured duration of the stitched file
    pub duration_secs: f64,
    pub byte_size: u64,
    /// Voice used for each speaker
    pub voices: BTreeMap<Speaker, String>,
    pub format: AudioFormat,
    pub pipeline_version: String,
    pub created_at: Timestamp,
}

/// Article a run was generated from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    pub title: String,
    pub url: String,
    pub word_count: usize,
    pub fetched_at: Timestamp,
}

impl From<&SourceDocument> for SourceReference {
    fn from(document: &SourceDocument) -> Self {
        Self {
            title: document.title.clone(),
            url: document.url.clone(),
            word_count: document.word_count,
            fetched_at: document.fetched_at,
        }
    }
}

/// Stage status with its wall-clock duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    #[serde(flatten)]
    pub stage: PipelineStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<i64>,
}

/// Files produced by a run so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    Completed,
    Failed {
        /// Stage that failed; absent when persisting the result failed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stage: Option<StageName>,
        category: ErrorCategory,
        error: String,
    },
}

/// Provenance record of a run, persisted as `metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub run_id: RunId,
    pub pipeline_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<GenerationParams>,
    pub stages: Vec<StageRecord>,
    pub artifacts: ArtifactPaths,
    pub outcome: Outcome,
    pub created_at: Timestamp,
    pub finished_at: Timestamp,
}

/// Drives content fetch, script generation, speech synthesis and audio
/// stitch for one input at a time
///
/// Holds no per-run state, so one instance can serve many runs.
pub struct Orchestrator {
    source: Arc<dyn ContentSource>,
    writer: ScriptWriter,
    synthesizer: SegmentSynthesizer,
    stitcher: AudioStitcher,
    store: ArtifactStore,
    source_config: SourceConfig,
    voices: VoiceConfig,
    max_retries: u32,
}

/// Builds an [`Orchestrator`], defaulting each collaborator from config
pub struct OrchestratorBuilder<'a> {
    config: &'a Config,
    source: Option<Arc<dyn ContentSource>>,
    llm: Option<Arc<dyn Provider>>,
    tts: Option<Arc<dyn TtsProvider>>,
}

impl OrchestratorBuilder<'_> {
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn Provider>) -> Self {
        self.llm = Some(llm);
        self
    }

    #[must_use]
    pub fn with_tts(mut self, tts: Arc<dyn TtsProvider>) -> Self {
        self.tts = Some(tts);
        self
    }

    pub fn build(self) -> Result<Orchestrator, PipelineError> {
        let config = self.config;

        let source = match self.source {
            Some(source) => source,
            None => Arc::new(WikipediaSource::new(&config.source).map_err(|e| PipelineError::Config(e.to_string()))?),
        };
        let llm = match self.llm {
            Some(llm) => llm,
            None => duet_llm::build_provider(&config.llm).map_err(|e| PipelineError::Config(e.to_string()))?,
        };
        let tts = match self.tts {
            Some(tts) => tts,
            None => duet_tts::build_provider(&config.tts).map_err(|e| PipelineError::Config(e.to_string()))?,
        };

        let store = ArtifactStore::new(config.output.dir.clone());

        tracing::debug!(
            source = source.name(),
            llm = llm.name(),
            tts = tts.name(),
            output = %store.root().display(),
            "orchestrator initialized"
        );

        Ok(Orchestrator {
            source,
            writer: ScriptWriter::new(llm, &config.llm, &config.script),
            synthesizer: SegmentSynthesizer::new(tts, &config.voices, store.clone(), &config.synthesis),
            stitcher: AudioStitcher::new(&config.audio),
            store,
            source_config: config.source.clone(),
            voices: config.voices.clone(),
            max_retries: config.synthesis.max_retries,
        })
    }
}

impl Orchestrator {
    /// Build an orchestrator with every collaborator taken from `config`
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        Self::builder(config).build()
    }

    pub const fn builder(config: &Config) -> OrchestratorBuilder<'_> {
        OrchestratorBuilder {
            config,
            source: None,
            llm: None,
            tts: None,
        }
    }

    pub const fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run all four stages for `input`
    ///
    /// The input is parsed before any stage starts. Stages run strictly in
    /// order; the first failure stops the run and is returned unchanged
    /// inside its [`PipelineError`] variant.
    pub async fn generate(
        &self,
        input: &str,
        kind: Option<InputKind>,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<PipelineResult, PipelineError> {
        let query = DocumentQuery::parse(input, kind, &self.source_config).map_err(PipelineError::Input)?;

        let span = tracing::info_span!("generate", title = %query.title, language = %query.language);
        let mut run = RunTracker::new(observer);

        let result = self.run_stages(&query, &mut run).instrument(span).await;

        if let Err(e) = &result {
            self.record_failure(&run, e).await;
        }

        result
    }

    async fn run_stages(&self, query: &DocumentQuery, run: &mut RunTracker<'_>) -> Result<PipelineResult, PipelineError> {
        run.start(StageName::ContentFetch, format!("fetching '{}' from {}", query.title, self.source.name()));
        let fetched = self.source.fetch(query).await.map_err(PipelineError::Fetch);
        let document = run.settle(StageName::ContentFetch, fetched, |document| {
            format!("fetched '{}' ({} words)", document.title, document.word_count)
        })?;
        run.source = Some(SourceReference::from(&document));

        run.start(StageName::ScriptGeneration, "drafting conversation script".to_string());
        let drafted = async {
            let script = self.writer.write(&document).await?;
            run.attach(&script);
            self.store.prepare_run(&script.id).await?;
            let path = self.store.save_script(&script).await?;
            Ok::<_, PipelineError>((script, path))
        }
        .await;
        let (script, script_path) = run.settle(StageName::ScriptGeneration, drafted, |(script, _)| {
            format!(
                "script has {} lines, about {}s",
                script.lines.len(),
                script.estimated_duration_secs
            )
        })?;
        run.artifacts.script = Some(script_path.clone());

        run.start(
            StageName::SpeechSynthesis,
            format!("synthesizing {} lines", script.lines.len()),
        );
        let synthesized = self
            .synthesizer
            .synthesize_with_retry(&script.id, &script.lines, self.max_retries)
            .await
            .map_err(PipelineError::from);
        let segments = run.settle(StageName::SpeechSynthesis, synthesized, |segments| {
            format!("synthesized {} segments", segments.len())
        })?;
        run.artifacts.segments = Some(self.store.segments_dir(&script.id));

        run.start(StageName::AudioStitch, format!("stitching {} segments", segments.len()));
        let audio_path = self.store.audio_path(&script.id, self.stitcher.extension());
        let stitched = self
            .stitcher
            .stitch(&script.id, &segments, &self.store.scratch_dir(&script.id), &audio_path)
            .await
            .map_err(PipelineError::from);
        let audio = run.settle(StageName::AudioStitch, stitched, |audio| {
            format!("stitched {:.1}s of audio", audio.duration_secs)
        })?;
        run.artifacts.audio = Some(audio.path.clone());

        let result = self.build_result(&script, script_path, audio.path, audio.duration_secs, audio.byte_size);
        if let Err(e) = self.persist(&result, run).await {
            self.store.discard_outputs(&result.run_id, &result.audio_path).await;
            run.artifacts.audio = None;
            run.artifacts.result = None;
            return Err(e);
        }

        tracing::info!(
            run_id = %result.run_id,
            duration_secs = result.duration_secs,
            bytes = result.byte_size,
            "generation completed"
        );

        Ok(result)
    }

    async fn persist(&self, result: &PipelineResult, run: &mut RunTracker<'_>) -> Result<(), PipelineError> {
        run.artifacts.result = Some(self.store.save_result(result).await?);
        self.store
            .save_metadata(&run.metadata(&result.run_id, Outcome::Completed))
            .await?;
        Ok(())
    }

    fn build_result(
        &self,
        script: &Script,
        script_path: PathBuf,
        audio_path: PathBuf,
        duration_secs: f64,
        byte_size: u64,
    ) -> PipelineResult {
        PipelineResult {
            run_id: script.id.clone(),
            title: script.title.clone(),
            source_url: script.source_url.clone(),
            script_path,
            audio_path,
            duration_secs,
            byte_size,
            voices: BTreeMap::from([
                (Speaker::Host, self.voices.host.clone()),
                (Speaker::Guest, self.voices.guest.clone()),
            ]),
            format: self.stitcher.format(),
            pipeline_version: PIPELINE_VERSION.to_string(),
            created_at: Timestamp::now(),
        }
    }

    /// Persist a failure record once the run has an identifier
    async fn record_failure(&self, run: &RunTracker<'_>, error: &PipelineError) {
        let Some(run_id) = run.run_id.as_ref() else {
            tracing::warn!(category = %error.category(), error = %error, "generation failed before a run was created");
            return;
        };

        let outcome = Outcome::Failed {
            stage: run.failed_stage(),
            category: error.category(),
            error: error.to_string(),
        };

        if let Err(e) = self.store.save_metadata(&run.metadata(run_id, outcome)).await {
            tracing::warn!(run_id = %run_id, error = %e, "failed to persist failure metadata");
        }

        tracing::error!(run_id = %run_id, category = %error.category(), error = %error, "generation failed");
    }
}

/// Stage bookkeeping and observer notification for one run
struct RunTracker<'a> {
    observer: Option<&'a dyn ProgressObserver>,
    run_id: Option<RunId>,
    stages: Vec<PipelineStage>,
    source: Option<SourceReference>,
    params: Option<GenerationParams>,
    artifacts: ArtifactPaths,
    created_at: Timestamp,
}

impl<'a> RunTracker<'a> {
    fn new(observer: Option<&'a dyn ProgressObserver>) -> Self {
        Self {
            observer,
            run_id: None,
            stages: StageName::ordered().into_iter().map(PipelineStage::pending).collect(),
            source: None,
            params: None,
            artifacts: ArtifactPaths::default(),
            created_at: Timestamp::now(),
        }
    }

    fn attach(&mut self, script: &Script) {
        self.run_id = Some(script.id.clone());
        self.params = Some(script.params.clone());
    }

    fn stage_mut(&mut self, name: StageName) -> &mut PipelineStage {
        &mut self.stages[name as usize]
    }

    fn start(&mut self, name: StageName, message: String) {
        let stage = self.stage_mut(name);
        stage.status = StageStatus::InProgress;
        stage.started_at = Some(Timestamp::now());
        self.emit(name, StageStatus::InProgress, message);
    }

    /// Close a stage from its result, notifying the observer either way
    fn settle<T, E: Display>(
        &mut self,
        name: StageName,
        result: Result<T, E>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T, E> {
        let now = Timestamp::now();
        match result {
            Ok(value) => {
                let stage = self.stage_mut(name);
                stage.status = StageStatus::Completed;
                stage.finished_at = Some(now);
                self.emit(name, StageStatus::Completed, describe(&value));
                Ok(value)
            }
            Err(e) => {
                let message = e.to_string();
                let stage = self.stage_mut(name);
                stage.status = StageStatus::Failed;
                stage.finished_at = Some(now);
                stage.error = Some(message.clone());
                self.emit(name, StageStatus::Failed, message);
                Err(e)
            }
        }
    }

    fn emit(&self, stage: StageName, status: StageStatus, message: String) {
        let Some(observer) = self.observer else { return };
        observer.on_event(&ProgressEvent {
            run_id: self.run_id.clone(),
            stage,
            status,
            message,
            at: Timestamp::now(),
        });
    }

    fn failed_stage(&self) -> Option<StageName> {
        self.stages
            .iter()
            .find(|stage| stage.status == StageStatus::Failed)
            .map(|stage| stage.name)
    }

    fn metadata(&self, run_id: &RunId, outcome: Outcome) -> GenerationMetadata {
        GenerationMetadata {
            run_id: run_id.clone(),
            pipeline_version: PIPELINE_VERSION.to_string(),
            source: self.source.clone(),
            params: self.params.clone(),
            stages: self
                .stages
                .iter()
                .map(|stage| StageRecord {
                    elapsed_ms: stage.elapsed_ms(),
                    stage: stage.clone(),
                })
                .collect(),
            artifacts: self.artifacts.clone(),
            outcome,
            created_at: self.created_at,
            finished_at: Timestamp::now(),
        }
    }
}
