use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Expand, parse and validate configuration held in memory
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error naming the first inconsistent setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_source()?;
        self.validate_tts()?;
        self.validate_synthesis()?;
        self.validate_script()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_source(&self) -> anyhow::Result<()> {
        let source = &self.source;

        if source.languages.is_empty() {
            anyhow::bail!("source.languages must list at least one language");
        }

        if !source.languages.iter().any(|lang| lang == &source.default_language) {
            anyhow::bail!(
                "source.default_language '{}' is not listed in source.languages",
                source.default_language
            );
        }

        if source.min_words >= source.max_words {
            anyhow::bail!("source.min_words must be lower than source.max_words");
        }

        Ok(())
    }

    /// Speech synthesis needs a key and two distinct voices
    fn validate_tts(&self) -> anyhow::Result<()> {
        let has_key = self
            .tts
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty());
        if !has_key {
            anyhow::bail!("tts.api_key must be set");
        }

        let voices = &self.voices;
        if voices.host.trim().is_empty() || voices.guest.trim().is_empty() {
            anyhow::bail!("voices.host and voices.guest must not be empty");
        }
        if voices.host == voices.guest {
            anyhow::bail!("voices.host and voices.guest must differ (both are '{}')", voices.host);
        }

        Ok(())
    }

    fn validate_synthesis(&self) -> anyhow::Result<()> {
        if self.synthesis.concurrency == 0 {
            anyhow::bail!("synthesis.concurrency must be greater than 0");
        }

        if self.synthesis.assumed_bitrate_kbps == 0 {
            anyhow::bail!("synthesis.assumed_bitrate_kbps must be greater than 0");
        }

        // Keeps `2^attempt` within u64 milliseconds
        if self.synthesis.max_retries > 20 {
            anyhow::bail!("synthesis.max_retries exceeds maximum of 20");
        }

        if self.audio.channels == 0 {
            anyhow::bail!("audio.channels must be greater than 0");
        }

        Ok(())
    }

    fn validate_script(&self) -> anyhow::Result<()> {
        if self.script.min_duration_secs > self.script.max_duration_secs {
            anyhow::bail!("script.min_duration_secs must not exceed script.max_duration_secs");
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        let Some(ref telemetry) = self.telemetry else {
            return Ok(());
        };

        if !(0.0..=1.0).contains(&telemetry.sampling_rate) {
            anyhow::bail!("telemetry.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use crate::{DurationPolicy, LlmProviderType, LogFormat, RetryScope, TtsProviderType};

    use super::*;

    const MINIMAL: &str = r#"
        [tts]
        api_key = "sk-tts"
    "#;

    #[test]
    fn minimal_config_applies_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert_eq!(config.llm.provider_type, LlmProviderType::Openai);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.tts.provider_type, TtsProviderType::OpenaiTts);
        assert_eq!(config.tts.response_format, "mp3");
        assert_eq!(config.voices.host, "nova");
        assert_eq!(config.voices.guest, "onyx");
        assert_eq!(config.synthesis.max_retries, 3);
        assert_eq!(config.synthesis.base_delay_ms, 1000);
        assert_eq!(config.synthesis.concurrency, 1);
        assert_eq!(config.synthesis.retry_scope, RetryScope::Batch);
        assert_eq!(config.script.min_duration_secs, 120);
        assert_eq!(config.script.max_duration_secs, 180);
        assert_eq!(config.script.duration_policy, DurationPolicy::Warn);
        assert_eq!(config.source.languages, ["en"]);
        assert_eq!(config.audio.sample_rate_hz, 44_100);
        assert_eq!(config.audio.channels, 1);
        assert!(config.telemetry.is_none());
    }

    #[test]
    fn full_config_round_trips_every_section() {
        let raw = r#"
            [source]
            languages = ["en", "de"]
            default_language = "de"
            min_words = 100
            max_words = 2000

            [llm]
            type = "anthropic"
            api_key = "sk-ant"
            model = "claude-sonnet-4-5"
            temperature = 0.7

            [tts]
            type = "elevenlabs"
            api_key = "el-key"
            model = "eleven_multilingual_v2"

            [voices]
            host = "Rachel"
            guest = "Adam"

            [synthesis]
            max_retries = 5
            concurrency = 4
            retry_scope = "line"

            [audio]
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            bitrate_kbps = 192

            [script]
            duration_policy = "reject"

            [output]
            dir = "/var/lib/duet"

            [telemetry]
            log_format = "json"
            log_filter = "duet=debug"

            [telemetry.exporter]
            endpoint = "http://localhost:4317"
        "#;

        let config = Config::from_toml(raw).unwrap();

        assert_eq!(config.source.default_language, "de");
        assert_eq!(config.llm.provider_type, LlmProviderType::Anthropic);
        assert!(config.llm.temperature.is_some_and(|t| (t - 0.7).abs() < f64::EPSILON));
        assert_eq!(config.tts.provider_type, TtsProviderType::Elevenlabs);
        assert_eq!(config.voices.host, "Rachel");
        assert_eq!(config.synthesis.concurrency, 4);
        assert_eq!(config.synthesis.retry_scope, RetryScope::Line);
        assert_eq!(config.audio.bitrate_kbps, 192);
        assert_eq!(config.script.duration_policy, DurationPolicy::Reject);
        assert_eq!(config.output.dir, Path::new("/var/lib/duet"));

        let telemetry = config.telemetry.unwrap();
        assert_eq!(telemetry.log_format, LogFormat::Json);
        assert_eq!(telemetry.service_name, "duet");
        assert_eq!(telemetry.exporter.unwrap().endpoint.as_str(), "http://localhost:4317/");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"
            [tts]
            api_key = "sk-tts"
            voice = "nova"
        "#;

        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("unknown field `voice`"), "{err}");
    }

    #[test]
    fn missing_tts_key_is_rejected() {
        let err = Config::from_toml("").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"tts.api_key must be set");
    }

    #[test]
    fn identical_voices_are_rejected() {
        let raw = r#"
            [tts]
            api_key = "sk-tts"

            [voices]
            host = "alloy"
            guest = "alloy"
        "#;

        let err = Config::from_toml(raw).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"voices.host and voices.guest must differ (both are 'alloy')");
    }

    #[test]
    fn inverted_duration_window_is_rejected() {
        let raw = r#"
            [tts]
            api_key = "sk-tts"

            [script]
            min_duration_secs = 200
            max_duration_secs = 100
        "#;

        assert!(Config::from_toml(raw).is_err());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let raw = r#"
            [tts]
            api_key = "sk-tts"

            [synthesis]
            concurrency = 0
        "#;

        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("synthesis.concurrency"));
    }

    #[test]
    fn default_language_must_be_accepted() {
        let raw = r#"
            [source]
            languages = ["fr"]

            [tts]
            api_key = "sk-tts"
        "#;

        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("default_language 'en'"));
    }

    #[test]
    fn load_expands_environment_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
                [tts]
                api_key = "{{ env.DUET_TEST_TTS_KEY }}"

                [output]
                dir = '{{ env.DUET_TEST_OUT | default("runs") }}'
            "#,
        )
        .unwrap();

        temp_env::with_vars([("DUET_TEST_TTS_KEY", Some("sk-from-env")), ("DUET_TEST_OUT", None)], || {
            let config = Config::load(file.path()).unwrap();
            let key = config.tts.api_key.unwrap();
            assert_eq!(key.expose_secret(), "sk-from-env");
            assert_eq!(config.output.dir, Path::new("runs"));
        });
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read config file"));
    }
}
