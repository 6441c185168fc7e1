//! Programmatic config pointing every collaborator at local mocks

use std::path::Path;

use duet_config::{
    AudioConfig, Config, LlmConfig, OutputConfig, SourceConfig, SynthesisConfig, TtsConfig, VoiceConfig,
};
use secrecy::SecretString;
use url::Url;

#[cfg(unix)]
use super::tools::StubTools;

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from defaults with output under `output_dir`
    pub fn new(output_dir: &Path) -> Self {
        Self {
            config: Config {
                output: OutputConfig {
                    dir: output_dir.to_path_buf(),
                },
                voices: VoiceConfig {
                    host: "nova".to_string(),
                    guest: "onyx".to_string(),
                },
                synthesis: SynthesisConfig {
                    max_retries: 0,
                    base_delay_ms: 10,
                    ..SynthesisConfig::default()
                },
                ..Config::default()
            },
        }
    }

    pub fn source(mut self, api_url: &str) -> Self {
        self.config.source = SourceConfig {
            base_url: Some(parse(api_url)),
            ..SourceConfig::default()
        };
        self
    }

    pub fn llm(mut self, base_url: &str) -> Self {
        self.config.llm = LlmConfig {
            api_key: Some(SecretString::from("sk-test-llm")),
            base_url: Some(parse(base_url)),
            model: "mock-model".to_string(),
            ..LlmConfig::default()
        };
        self
    }

    pub fn tts(mut self, base_url: &str) -> Self {
        self.config.tts = TtsConfig {
            api_key: Some(SecretString::from("sk-test-tts")),
            base_url: Some(parse(base_url)),
            ..TtsConfig::default()
        };
        self
    }

    #[cfg(unix)]
    pub fn tools(mut self, tools: &StubTools) -> Self {
        self.config.audio = AudioConfig {
            ffmpeg_path: tools.ffmpeg.clone(),
            ffprobe_path: tools.ffprobe.clone(),
            ..AudioConfig::default()
        };
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.synthesis.max_retries = retries;
        self
    }

    /// Finish and run the same validation as a loaded file
    pub fn build(self) -> Config {
        self.config.validate().expect("test config must be valid");
        self.config
    }
}

fn parse(url: &str) -> Url {
    Url::parse(url).expect("mock URL must parse")
}
