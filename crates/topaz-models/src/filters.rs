//! Filter builders for the video pipeline.
//!
//! A [`Filter`] is one named enhancement effect with its parameter bag,
//! forwarded as-is inside the create request. Builders are pure functions
//! from typed options; a knob only lands in the bag when it differs from
//! the no-op default.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::params::{self, ParamError};
use crate::video::Resolution;

/// Upscaling model identifiers.
pub const UPSCALE_MODELS: &[&str] = &[
    "prob-4", "rhea-1", "aaa-9", "ahq-12", "alq-13", "amq-13", "apf-2", "rxl-1", "thd-3", "thf-4",
];

/// Denoising model identifiers.
pub const VIDEO_DENOISE_MODELS: &[&str] = &[
    "nyx-3", "ddv-3", "dtd-4", "dtds-2", "dtv-4", "dtvs-2", "chf-3", "chr-2",
];

/// Frame interpolation model identifiers.
pub const INTERPOLATION_MODELS: &[&str] = &[
    "apo-8", "gcg-5", "ghq-5", "iris-2", "iris-3", "nxf-1", "nyx-3",
];

/// Temporal model families that accept a temporalConsistency knob.
const TEMPORAL_MODELS: &[&str] = &["dtd-4", "dtds-2", "dtv-4", "dtvs-2"];

/// Models that still honor manual knobs in auto mode.
const AUTO_TUNABLE_MODELS: &[&str] = &["nyx-3", "ddv-3"];

/// One named effect with its opaque parameter bag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    pub model: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Filter {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            params: Map::new(),
        }
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.params.insert(key.to_string(), value.into());
    }
}

/// Resolution upscaling factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum UpscaleFactor {
    #[default]
    #[serde(rename = "2x")]
    X2,
    #[serde(rename = "4x")]
    X4,
    #[serde(rename = "auto")]
    Auto,
}

impl UpscaleFactor {
    /// Integer multiplier applied to the source resolution.
    /// Auto currently resolves to 2x.
    pub fn multiplier(&self) -> u32 {
        match self {
            UpscaleFactor::X2 | UpscaleFactor::Auto => 2,
            UpscaleFactor::X4 => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpscaleFactor::X2 => "2x",
            UpscaleFactor::X4 => "4x",
            UpscaleFactor::Auto => "auto",
        }
    }
}

impl fmt::Display for UpscaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for the upscale filter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpscaleOptions {
    #[serde(default = "default_upscale_model")]
    pub model: String,
    #[serde(default)]
    pub factor: UpscaleFactor,
    /// Enhance fine details and textures.
    #[serde(default = "default_detail_enhancement")]
    pub detail_enhancement: f64,
    /// Edge sharpening intensity.
    #[serde(default)]
    pub sharpen: f64,
    /// Noise reduction intensity.
    #[serde(default)]
    pub noise_reduction: f64,
    /// Compression artifact removal.
    #[serde(default)]
    pub compression_recovery: f64,
    /// Fix blur and focus issues.
    #[serde(default)]
    pub focus_fix: f64,
    /// Recover lost original details.
    #[serde(default)]
    pub original_detail_recovery: f64,
}

fn default_upscale_model() -> String {
    "prob-4".to_string()
}
fn default_detail_enhancement() -> f64 {
    0.5
}

impl Default for UpscaleOptions {
    fn default() -> Self {
        Self {
            model: default_upscale_model(),
            factor: UpscaleFactor::X2,
            detail_enhancement: default_detail_enhancement(),
            sharpen: 0.0,
            noise_reduction: 0.0,
            compression_recovery: 0.0,
            focus_fix: 0.0,
            original_detail_recovery: 0.0,
        }
    }
}

impl UpscaleOptions {
    pub fn validate(&self) -> Result<(), ParamError> {
        params::UNIT.check("detail_enhancement", self.detail_enhancement)?;
        params::UNIT.check("sharpen", self.sharpen)?;
        params::UNIT.check("noise_reduction", self.noise_reduction)?;
        params::UNIT.check("compression_recovery", self.compression_recovery)?;
        params::UNIT.check("focus_fix", self.focus_fix)?;
        params::UNIT.check("original_detail_recovery", self.original_detail_recovery)?;
        Ok(())
    }

    /// Output resolution for a given source resolution.
    pub fn output_resolution(&self, source: Resolution) -> Resolution {
        source.scaled(self.factor.multiplier())
    }
}

/// Build the upscale filter bag.
pub fn upscale_filter(opts: &UpscaleOptions) -> Filter {
    let mut filter = Filter::new(&opts.model);
    if opts.detail_enhancement > 0.0 {
        filter.set("details", opts.detail_enhancement);
    }
    if opts.sharpen > 0.0 {
        filter.set("sharpen", opts.sharpen);
    }
    if opts.noise_reduction > 0.0 {
        filter.set("noise", opts.noise_reduction);
    }
    if opts.compression_recovery > 0.0 {
        filter.set("compression", opts.compression_recovery);
    }
    if opts.focus_fix > 0.0 {
        filter.set("focusFixLevel", opts.focus_fix);
    }
    if opts.original_detail_recovery > 0.0 {
        filter.set("recoverOriginalDetailValue", opts.original_detail_recovery);
    }
    filter
}

/// Automatic processing type for video denoising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum AutoType {
    #[default]
    Relative,
    Absolute,
    Custom,
}

impl AutoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoType::Relative => "Relative",
            AutoType::Absolute => "Absolute",
            AutoType::Custom => "Custom",
        }
    }
}

/// Options for the video denoise filter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoDenoiseOptions {
    #[serde(default = "default_denoise_model")]
    pub model: String,
    /// Automatic processing based on content analysis.
    #[serde(default = "default_true")]
    pub auto_mode: bool,
    #[serde(default)]
    pub auto_type: AutoType,
    #[serde(default = "default_noise_intensity")]
    pub noise_intensity: f64,
    #[serde(default = "default_compression_recovery")]
    pub compression_recovery: f64,
    #[serde(default = "default_detail_preservation")]
    pub detail_preservation: f64,
    /// Consistency across frames, honored by the temporal model families.
    #[serde(default = "default_temporal_consistency")]
    pub temporal_consistency: f64,
    /// Mild sharpening to counteract softening.
    #[serde(default = "default_mild_sharpen")]
    pub sharpen: f64,
}

fn default_denoise_model() -> String {
    "nyx-3".to_string()
}
fn default_true() -> bool {
    true
}
fn default_noise_intensity() -> f64 {
    0.5
}
fn default_compression_recovery() -> f64 {
    0.3
}
fn default_detail_preservation() -> f64 {
    0.7
}
fn default_temporal_consistency() -> f64 {
    0.8
}
fn default_mild_sharpen() -> f64 {
    0.1
}

impl Default for VideoDenoiseOptions {
    fn default() -> Self {
        Self {
            model: default_denoise_model(),
            auto_mode: true,
            auto_type: AutoType::Relative,
            noise_intensity: default_noise_intensity(),
            compression_recovery: default_compression_recovery(),
            detail_preservation: default_detail_preservation(),
            temporal_consistency: default_temporal_consistency(),
            sharpen: default_mild_sharpen(),
        }
    }
}

impl VideoDenoiseOptions {
    pub fn validate(&self) -> Result<(), ParamError> {
        params::UNIT.check("noise_intensity", self.noise_intensity)?;
        params::UNIT.check("compression_recovery", self.compression_recovery)?;
        params::UNIT.check("detail_preservation", self.detail_preservation)?;
        params::UNIT.check("temporal_consistency", self.temporal_consistency)?;
        params::UNIT.check("sharpen", self.sharpen)?;
        Ok(())
    }
}

/// Build the video denoise filter bag.
///
/// Manual knobs apply when auto mode is off, and also for the models that
/// support fine-tuning alongside auto processing.
pub fn denoise_filter(opts: &VideoDenoiseOptions) -> Filter {
    let mut filter = Filter::new(&opts.model);
    if opts.auto_mode {
        filter.set("auto", opts.auto_type.as_str());
    }
    if !opts.auto_mode || AUTO_TUNABLE_MODELS.contains(&opts.model.as_str()) {
        if opts.noise_intensity > 0.0 {
            filter.set("noise", opts.noise_intensity);
        }
        if opts.compression_recovery > 0.0 {
            filter.set("compression", opts.compression_recovery);
        }
        if opts.detail_preservation > 0.0 {
            filter.set("details", opts.detail_preservation);
        }
        if opts.sharpen > 0.0 {
            filter.set("sharpen", opts.sharpen);
        }
        if TEMPORAL_MODELS.contains(&opts.model.as_str()) && opts.temporal_consistency > 0.0 {
            filter.set("temporalConsistency", opts.temporal_consistency);
        }
    }
    filter
}

/// Options for the frame interpolation filter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InterpolationOptions {
    #[serde(default = "default_interpolation_model")]
    pub model: String,
    /// Target output frame rate.
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    /// Slow motion multiplier; 1 means normal speed.
    #[serde(default = "default_slowmo")]
    pub slowmo_factor: i64,
    /// Drop duplicate frames before interpolating.
    #[serde(default = "default_true")]
    pub remove_duplicates: bool,
    /// Duplicate detection threshold; lower is stricter.
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,
}

fn default_interpolation_model() -> String {
    "apo-8".to_string()
}
fn default_target_fps() -> f64 {
    60.0
}
fn default_slowmo() -> i64 {
    1
}
fn default_duplicate_threshold() -> f64 {
    0.1
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self {
            model: default_interpolation_model(),
            target_fps: default_target_fps(),
            slowmo_factor: default_slowmo(),
            remove_duplicates: true,
            duplicate_threshold: default_duplicate_threshold(),
        }
    }
}

impl InterpolationOptions {
    pub fn validate(&self) -> Result<(), ParamError> {
        params::SLOWMO_FACTOR.check("slowmo_factor", self.slowmo_factor as f64)?;
        params::UNIT.check("duplicate_threshold", self.duplicate_threshold)?;
        Ok(())
    }
}

/// Build the frame interpolation filter bag.
pub fn interpolation_filter(opts: &InterpolationOptions) -> Filter {
    let mut filter = Filter::new(&opts.model);
    filter.set("fps", opts.target_fps);
    filter.set("slowmo", opts.slowmo_factor);
    if opts.remove_duplicates {
        filter.set("duplicate", true);
        filter.set("duplicateThreshold", opts.duplicate_threshold);
    }
    filter
}
