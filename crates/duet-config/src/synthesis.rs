use serde::Deserialize;

/// Synthesis retry and concurrency policy
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Retries after the first attempt; total attempts is this plus one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff before retry `n` is `base_delay_ms * 2^n`
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Concurrent synthesis calls; 1 keeps lines strictly sequential
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub retry_scope: RetryScope,
    /// Bitrate assumed when estimating segment duration from byte size
    #[serde(default = "default_assumed_bitrate_kbps")]
    pub assumed_bitrate_kbps: u32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            concurrency: default_concurrency(),
            retry_scope: RetryScope::default(),
            assumed_bitrate_kbps: default_assumed_bitrate_kbps(),
        }
    }
}

/// What a retry regenerates after a failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryScope {
    /// Discard every segment and restart from line 1
    #[default]
    Batch,
    /// Retry only the failing line
    Line,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    1000
}

const fn default_concurrency() -> usize {
    1
}

const fn default_assumed_bitrate_kbps() -> u32 {
    128
}
