//! Video enhancement nodes.
//!
//! Video runs are long: the node submits a job, uploads the source,
//! then relays remote progress to the host while the provider works.
//! Status lines accumulate so the host shows a running log.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use topaz_models::{
    denoise_filter, interpolation_filter, params, upscale_filter, Filter, InterpolationOptions,
    OutputSettings, ParamError, ParamSpec, SourceInfo, UpscaleOptions, VideoDenoiseOptions,
    INTERPOLATION_MODELS, UPSCALE_MODELS, VIDEO_DENOISE_MODELS,
};

use crate::context::{NodeContext, StatusReporter};
use crate::error::NodeResult;
use crate::host::artifact_filename;
use crate::output::{slug, NodeOutput};

fn default_timeout_minutes() -> u64 {
    60
}

/// Settings shared by all video nodes: output encoding plus the
/// polling budget.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoNodeSettings {
    #[serde(default)]
    pub output: OutputSettings,
    /// How long to wait for the remote job, in minutes.
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,
}

impl Default for VideoNodeSettings {
    fn default() -> Self {
        Self {
            output: OutputSettings::default(),
            timeout_minutes: default_timeout_minutes(),
        }
    }
}

impl VideoNodeSettings {
    pub fn validate(&self) -> Result<(), ParamError> {
        params::TIMEOUT_MINUTES.check("timeout_minutes", self.timeout_minutes as f64)
    }
}

/// Drives one video job end to end and persists the result.
async fn run_video_job(
    ctx: &NodeContext,
    reporter: &StatusReporter,
    settings: &VideoNodeSettings,
    source: SourceInfo,
    output: OutputSettings,
    filter: Filter,
    data: Vec<u8>,
    hint: &str,
) -> NodeResult<NodeOutput> {
    settings.validate()?;
    let config = ctx
        .client_config
        .clone()
        .with_max_wait_minutes(settings.timeout_minutes);
    let client = ctx.clone().with_client_config(config).client().await?;

    reporter.status("Submitting video job").await;
    let (job, bytes) = client
        .run_to_completion(
            &source,
            &output,
            std::slice::from_ref(&filter),
            data,
            reporter,
            &ctx.cancel,
        )
        .await?;

    reporter.status("Saving result").await;
    let filename = artifact_filename(hint, &bytes, &output.container);
    let url = ctx.artifacts.save(&bytes, &filename).await?;

    reporter
        .status(&format!("Complete (request {})", job.request_id))
        .await;
    info!(request_id = %job.request_id, %url, "video node finished");
    Ok(NodeOutput::artifact(url).with_request_id(job.request_id))
}

/// Upscale a video to 2x or 4x the source resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VideoUpscaleNode {
    #[serde(default)]
    pub options: UpscaleOptions,
    #[serde(default)]
    pub settings: VideoNodeSettings,
}

impl VideoUpscaleNode {
    pub fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::choice("model", "prob-4", UPSCALE_MODELS),
            ParamSpec::choice("factor", "2x", &["2x", "4x", "auto"]),
            ParamSpec::float("detail_enhancement", 0.5, params::UNIT),
            ParamSpec::float("sharpen", 0.0, params::UNIT),
            ParamSpec::float("noise_reduction", 0.0, params::UNIT),
            ParamSpec::float("compression_recovery", 0.0, params::UNIT),
            ParamSpec::float("focus_fix", 0.0, params::UNIT),
            ParamSpec::float("original_detail_recovery", 0.0, params::UNIT),
            ParamSpec::int("timeout_minutes", 60, params::TIMEOUT_MINUTES),
        ]
    }

    pub async fn run(&self, ctx: &NodeContext, video: Vec<u8>) -> NodeResult<NodeOutput> {
        let reporter = ctx.reporter(true);
        let result = self.run_inner(ctx, &reporter, video).await;
        if let Err(err) = &result {
            reporter.status(&err.to_string()).await;
        }
        result
    }

    async fn run_inner(
        &self,
        ctx: &NodeContext,
        reporter: &StatusReporter,
        video: Vec<u8>,
    ) -> NodeResult<NodeOutput> {
        self.options.validate()?;

        let source = SourceInfo::placeholder(video.len() as u64);
        let target = self.options.output_resolution(source.resolution);
        let mut output = self.settings.output.clone();
        output.resolution = Some(target);
        output.frame_rate = Some(source.frame_rate);

        reporter
            .status(&format!(
                "Upscaling to {}x{} with {}",
                target.width, target.height, self.options.model
            ))
            .await;

        let hint = format!(
            "upscaled_{}_{}",
            slug(&self.options.model),
            self.options.factor
        );
        run_video_job(
            ctx,
            reporter,
            &self.settings,
            source,
            output,
            upscale_filter(&self.options),
            video,
            &hint,
        )
        .await
    }
}

/// Remove noise and compression artifacts from a video.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VideoDenoiseNode {
    #[serde(default)]
    pub options: VideoDenoiseOptions,
    #[serde(default)]
    pub settings: VideoNodeSettings,
}

impl VideoDenoiseNode {
    pub fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::choice("model", "nyx-3", VIDEO_DENOISE_MODELS),
            ParamSpec::bool("auto_mode", true),
            ParamSpec::choice("auto_type", "Relative", &["Relative", "Absolute", "Custom"]),
            ParamSpec::float("noise_intensity", 0.5, params::UNIT),
            ParamSpec::float("compression_recovery", 0.3, params::UNIT),
            ParamSpec::float("detail_preservation", 0.7, params::UNIT),
            ParamSpec::float("temporal_consistency", 0.8, params::UNIT),
            ParamSpec::float("sharpen", 0.1, params::UNIT),
            ParamSpec::int("timeout_minutes", 60, params::TIMEOUT_MINUTES),
        ]
    }

    pub async fn run(&self, ctx: &NodeContext, video: Vec<u8>) -> NodeResult<NodeOutput> {
        let reporter = ctx.reporter(true);
        let result = self.run_inner(ctx, &reporter, video).await;
        if let Err(err) = &result {
            reporter.status(&err.to_string()).await;
        }
        result
    }

    async fn run_inner(
        &self,
        ctx: &NodeContext,
        reporter: &StatusReporter,
        video: Vec<u8>,
    ) -> NodeResult<NodeOutput> {
        self.options.validate()?;

        let source = SourceInfo::placeholder(video.len() as u64);
        let output = self.settings.output.clone().matching_source(&source);

        reporter
            .status(&format!("Denoising video with {}", self.options.model))
            .await;

        let hint = format!("denoised_{}", slug(&self.options.model));
        run_video_job(
            ctx,
            reporter,
            &self.settings,
            source,
            output,
            denoise_filter(&self.options),
            video,
            &hint,
        )
        .await
    }
}

/// Raise the frame rate or generate slow motion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FrameInterpolationNode {
    #[serde(default)]
    pub options: InterpolationOptions,
    #[serde(default)]
    pub settings: VideoNodeSettings,
}

impl FrameInterpolationNode {
    pub fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::choice("model", "apo-8", INTERPOLATION_MODELS),
            ParamSpec::float("target_fps", 60.0, topaz_models::ParamRange::new(1.0, 240.0)),
            ParamSpec::int("slowmo_factor", 1, params::SLOWMO_FACTOR),
            ParamSpec::bool("remove_duplicates", true),
            ParamSpec::float("duplicate_threshold", 0.1, params::UNIT),
            ParamSpec::int("timeout_minutes", 60, params::TIMEOUT_MINUTES),
        ]
    }

    pub async fn run(&self, ctx: &NodeContext, video: Vec<u8>) -> NodeResult<NodeOutput> {
        let reporter = ctx.reporter(true);
        let result = self.run_inner(ctx, &reporter, video).await;
        if let Err(err) = &result {
            reporter.status(&err.to_string()).await;
        }
        result
    }

    async fn run_inner(
        &self,
        ctx: &NodeContext,
        reporter: &StatusReporter,
        video: Vec<u8>,
    ) -> NodeResult<NodeOutput> {
        self.options.validate()?;

        let source = SourceInfo::placeholder(video.len() as u64);
        let mut output = self.settings.output.clone().matching_source(&source);
        output.frame_rate = Some(self.options.target_fps.round() as u32);

        reporter
            .status(&format!(
                "Interpolating to {:.0} fps with {}",
                self.options.target_fps, self.options.model
            ))
            .await;

        let hint = format!(
            "interpolated_{}_{:.0}fps",
            slug(&self.options.model),
            self.options.target_fps
        );
        run_video_job(
            ctx,
            reporter,
            &self.settings,
            source,
            output,
            interpolation_filter(&self.options),
            video,
            &hint,
        )
        .await
    }
}
