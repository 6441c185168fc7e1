use std::path::PathBuf;

use serde::Deserialize;

/// Audio tool location and output format of the stitched conversation
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioConfig {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: PathBuf,
    /// Integrated loudness target in LUFS
    #[serde(default = "default_loudness")]
    pub target_loudness: f64,
    /// True-peak ceiling in dBTP
    #[serde(default = "default_true_peak")]
    pub true_peak: f64,
    #[serde(default = "default_loudness_range")]
    pub loudness_range: f64,
    #[serde(default = "default_codec")]
    pub codec: String,
    /// Output file extension
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: u32,
    #[serde(default = "default_channels")]
    pub channels: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            target_loudness: default_loudness(),
            true_peak: default_true_peak(),
            loudness_range: default_loudness_range(),
            codec: default_codec(),
            extension: default_extension(),
            bitrate_kbps: default_bitrate_kbps(),
            sample_rate_hz: default_sample_rate_hz(),
            channels: default_channels(),
        }
    }
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

#[allow(clippy::missing_const_for_fn)]
fn default_loudness() -> f64 {
    -16.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_true_peak() -> f64 {
    -1.5
}

#[allow(clippy::missing_const_for_fn)]
fn default_loudness_range() -> f64 {
    11.0
}

fn default_codec() -> String {
    "libmp3lame".to_string()
}

fn default_extension() -> String {
    "mp3".to_string()
}

const fn default_bitrate_kbps() -> u32 {
    128
}

const fn default_sample_rate_hz() -> u32 {
    44_100
}

const fn default_channels() -> u8 {
    1
}
