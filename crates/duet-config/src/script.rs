use serde::Deserialize;

/// Duration window and prompt versioning for generated scripts
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptConfig {
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: u32,
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u32,
    /// What happens when the estimated duration leaves the window
    #[serde(default)]
    pub duration_policy: DurationPolicy,
    /// Recorded with the generation parameters of every script
    #[serde(default = "default_prompt_version")]
    pub prompt_version: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: default_min_duration(),
            max_duration_secs: default_max_duration(),
            duration_policy: DurationPolicy::default(),
            prompt_version: default_prompt_version(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Log a warning and accept the script
    #[default]
    Warn,
    /// Reject the script
    Reject,
}

const fn default_min_duration() -> u32 {
    120
}

const fn default_max_duration() -> u32 {
    180
}

fn default_prompt_version() -> String {
    "v1".to_string()
}
