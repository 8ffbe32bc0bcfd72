//! Video source and output descriptors.
//!
//! These types serialize directly into the wire format the video API
//! expects (camelCase field names).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default output container.
pub const DEFAULT_CONTAINER: &str = "mp4";
/// Default video encoder.
pub const DEFAULT_VIDEO_ENCODER: &str = "H265";
/// Default encoding profile.
pub const DEFAULT_VIDEO_PROFILE: &str = "Main";
/// Default audio codec.
pub const DEFAULT_AUDIO_CODEC: &str = "AAC";
/// Default audio handling.
pub const DEFAULT_AUDIO_TRANSFER: &str = "Copy";
/// Default audio bitrate in kbps.
pub const DEFAULT_AUDIO_BITRATE: &str = "320";
/// Default dynamic compression level.
pub const DEFAULT_COMPRESSION_LEVEL: &str = "High";

/// Allowed output containers.
pub const VIDEO_CONTAINERS: &[&str] = &["mp4", "mov", "mkv"];
/// Allowed video encoders.
pub const VIDEO_CODECS: &[&str] = &["H264", "H265", "ProRes"];
/// Allowed encoding profiles.
pub const VIDEO_PROFILES: &[&str] = &["Baseline", "Main", "High"];
/// Allowed audio codecs.
pub const AUDIO_CODECS: &[&str] = &["AAC", "MP3", "Opus"];
/// Allowed audio handling modes.
pub const AUDIO_TRANSFER_MODES: &[&str] = &["Copy", "Convert", "None"];
/// Allowed audio bitrates in kbps.
pub const AUDIO_BITRATES: &[&str] = &["128", "192", "256", "320"];
/// Allowed dynamic compression levels.
pub const COMPRESSION_LEVELS: &[&str] = &["Low", "Mid", "High"];

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale both dimensions by an integer factor.
    pub fn scaled(&self, factor: u32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Static metadata about the input video, sent with the create request.
///
/// Immutable once built. The remote side probes the uploaded bytes itself,
/// so these values describe, rather than control, the input.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// Container format of the input (e.g. "mp4")
    pub container: String,
    /// Input size in bytes
    pub size: u64,
    pub resolution: Resolution,
    /// Duration in milliseconds
    pub duration: u64,
    pub frame_rate: u32,
    pub frame_count: u64,
}

impl SourceInfo {
    /// Build source info with fixed placeholder media values.
    ///
    /// Only the byte size reflects the actual input; resolution, duration,
    /// frame rate and frame count are nominal 1080p30 values. Callers that
    /// have probed the real media should build [`SourceInfo`] directly.
    pub fn placeholder(size: u64) -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            size,
            resolution: Resolution::new(1920, 1080),
            duration: 10_000,
            frame_rate: 30,
            frame_count: 300,
        }
    }
}

/// Desired output encoding, built from node parameters once per job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    pub container: String,
    pub video_encoder: String,
    pub video_profile: String,
    pub audio_codec: String,
    pub audio_transfer: String,
    pub audio_bitrate: String,
    pub dynamic_compression_level: String,
    pub crop_to_fit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<u32>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            video_encoder: DEFAULT_VIDEO_ENCODER.to_string(),
            video_profile: DEFAULT_VIDEO_PROFILE.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_transfer: DEFAULT_AUDIO_TRANSFER.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            dynamic_compression_level: DEFAULT_COMPRESSION_LEVEL.to_string(),
            crop_to_fit: false,
            resolution: None,
            frame_rate: None,
        }
    }
}

impl OutputSettings {
    /// Carry the source resolution and frame rate through unchanged.
    pub fn matching_source(mut self, source: &SourceInfo) -> Self {
        self.resolution = Some(source.resolution);
        self.frame_rate = Some(source.frame_rate);
        self
    }
}
