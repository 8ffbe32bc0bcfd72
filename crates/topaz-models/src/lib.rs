//! Shared data models for the Topaz Labs enhancement API.
//!
//! This crate provides Serde-serializable types for:
//! - Image operation options with declarative range validation
//! - Video source/output descriptors in the API's wire format
//! - Per-operation filter builders
//! - Remote job status tracking

pub mod filters;
pub mod image;
pub mod job;
pub mod params;
pub mod video;

// Re-export common types
pub use filters::{
    denoise_filter, interpolation_filter, upscale_filter, AutoType, Filter, InterpolationOptions,
    UpscaleFactor, UpscaleOptions, VideoDenoiseOptions, INTERPOLATION_MODELS, UPSCALE_MODELS,
    VIDEO_DENOISE_MODELS,
};
pub use image::{
    CreativeOptions, DenoiseModel, DenoiseOptions, EnhanceModel, EnhanceOptions, GenerativeModel,
    OutputFormat,
};
pub use job::{ImageJobStatus, ProcessingJob, VideoJobStatus};
pub use params::{ParamError, ParamKind, ParamRange, ParamSpec};
pub use video::{OutputSettings, Resolution, SourceInfo};
