#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use args::{Args, Command};
use clap::Parser;
use duet_config::{Config, DurationPolicy, ScriptConfig};
use duet_core::{Categorize, DraftLine, GenerationParams, RunId, Section};
use duet_pipeline::{LogObserver, Orchestrator, ScriptMeta, Validator};
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Generate { input, kind } => {
            let config = Config::load(&args.config)?;
            let _telemetry_guard = duet_telemetry::init(config.telemetry.as_ref())?;

            tracing::info!(config_path = %args.config.display(), input = %input, "starting generation");
            generate(&config, &input, kind.map(Into::into)).await
        }
        Command::Show { run_id } => {
            let config = Config::load(&args.config)?;
            let _telemetry_guard = duet_telemetry::init(config.telemetry.as_ref())?;

            show(&config, run_id).await
        }
        Command::Validate { file, strict } => {
            let _telemetry_guard = duet_telemetry::init(None)?;
            validate(&file, strict)
        }
    }
}

async fn generate(config: &Config, input: &str, kind: Option<duet_source::InputKind>) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(config)?;

    let result = orchestrator
        .generate(input, kind, Some(&LogObserver))
        .await
        .map_err(|e| anyhow::anyhow!("generation failed [{}]: {e}", e.category()))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn show(config: &Config, run_id: String) -> anyhow::Result<()> {
    let store = duet_pipeline::ArtifactStore::new(config.output.dir.clone());
    let metadata = store.load_metadata(&RunId::from(run_id)).await?;

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

/// Computed facts about a script that passed validation
#[derive(Debug, Serialize)]
struct ScriptSummary {
    lines: usize,
    total_words: usize,
    estimated_duration_secs: u32,
    sections: BTreeMap<Section, Vec<u32>>,
}

fn validate(file: &Path, strict: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let lines: Vec<DraftLine> =
        serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON array of draft lines", file.display()))?;

    let validator = Validator::new(&ScriptConfig {
        duration_policy: if strict { DurationPolicy::Reject } else { DurationPolicy::Warn },
        ..ScriptConfig::default()
    });

    let meta = ScriptMeta {
        title: file
            .file_stem()
            .map_or_else(|| "script".to_string(), |stem| stem.to_string_lossy().into_owned()),
        source_url: file.display().to_string(),
        params: GenerationParams::default(),
        created_at: jiff::Timestamp::now(),
    };

    let script = validator.validate(lines, meta)?;
    let summary = ScriptSummary {
        lines: script.lines.len(),
        total_words: script.total_words,
        estimated_duration_secs: script.estimated_duration_secs,
        sections: script.sections,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
