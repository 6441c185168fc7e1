use std::path::PathBuf;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::script::Speaker;

/// One rendered clip for exactly one script line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSegment {
    /// Index of the line this clip renders
    pub line_index: u32,
    pub speaker: Speaker,
    /// Voice identity used by the synthesis provider
    pub voice: String,
    /// Location of the rendered bytes
    pub path: PathBuf,
    pub byte_size: u64,
    /// Duration estimated from the byte size at a fixed bitrate
    pub estimated_duration_secs: f64,
    pub created_at: Timestamp,
}

impl AudioSegment {
    /// Estimate playback seconds of `bytes` encoded at a constant bitrate
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate_duration(bytes: u64, bitrate_kbps: u32) -> f64 {
        if bitrate_kbps == 0 {
            return 0.0;
        }
        (bytes as f64 * 8.0) / (f64::from(bitrate_kbps) * 1000.0)
    }
}

/// Final normalized conversation audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchedAudio {
    pub path: PathBuf,
    /// Duration measured from the written file
    pub duration_secs: f64,
    pub byte_size: u64,
}

/// Fixed output format of the stitched audio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub codec: String,
    pub bitrate_kbps: u32,
    pub sample_rate_hz: u32,
    pub channels: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_uses_constant_bitrate() {
        // 16 000 bytes at 128 kbps is exactly one second
        assert!((AudioSegment::estimate_duration(16_000, 128) - 1.0).abs() < f64::EPSILON);
        assert!((AudioSegment::estimate_duration(0, 128)).abs() < f64::EPSILON);
        assert!((AudioSegment::estimate_duration(1024, 0)).abs() < f64::EPSILON);
    }
}
