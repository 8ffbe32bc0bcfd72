//! Image enhancement nodes.
//!
//! Each node is a thin runner: validate options, resolve the
//! credential, call the client, persist the result, report status.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use topaz_models::{CreativeOptions, DenoiseOptions, EnhanceOptions, ParamSpec};

use crate::context::NodeContext;
use crate::error::NodeResult;
use crate::host::artifact_filename;
use crate::output::{slug, NodeOutput};

/// Remove noise from a single image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DenoiseNode {
    #[serde(default)]
    pub options: DenoiseOptions,
}

impl DenoiseNode {
    pub fn param_specs() -> Vec<ParamSpec> {
        DenoiseOptions::param_specs()
    }

    pub async fn run(&self, ctx: &NodeContext, image: Vec<u8>) -> NodeResult<NodeOutput> {
        let reporter = ctx.reporter(false);
        let result = self.run_inner(ctx, &reporter, image).await;
        if let Err(err) = &result {
            reporter.status(&err.to_string()).await;
        }
        result
    }

    async fn run_inner(
        &self,
        ctx: &NodeContext,
        reporter: &crate::context::StatusReporter,
        image: Vec<u8>,
    ) -> NodeResult<NodeOutput> {
        self.options.validate()?;
        let client = ctx.client().await?;

        reporter
            .status(&format!("Denoising image ({} model)", self.options.model))
            .await;
        let bytes = client.denoise(image, &self.options).await?;

        let hint = format!("denoised_{}", slug(self.options.model.as_str()));
        let filename = artifact_filename(&hint, &bytes, self.options.output_format.as_str());
        let url = ctx.artifacts.save(&bytes, &filename).await?;

        reporter.status("Denoise complete").await;
        reporter.progress(100).await;
        info!(%url, "denoise node finished");
        Ok(NodeOutput::artifact(url))
    }
}

/// Upscale and sharpen a single image with a standard model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EnhanceNode {
    #[serde(default)]
    pub options: EnhanceOptions,
}

impl EnhanceNode {
    pub fn param_specs() -> Vec<ParamSpec> {
        EnhanceOptions::param_specs()
    }

    pub async fn run(&self, ctx: &NodeContext, image: Vec<u8>) -> NodeResult<NodeOutput> {
        let reporter = ctx.reporter(false);
        let result = self.run_inner(ctx, &reporter, image).await;
        if let Err(err) = &result {
            reporter.status(&err.to_string()).await;
        }
        result
    }

    async fn run_inner(
        &self,
        ctx: &NodeContext,
        reporter: &crate::context::StatusReporter,
        image: Vec<u8>,
    ) -> NodeResult<NodeOutput> {
        self.options.validate()?;
        let client = ctx.client().await?;

        reporter
            .status(&format!("Enhancing image ({} model)", self.options.model))
            .await;
        let bytes = client.enhance(image, &self.options).await?;

        let hint = format!("enhanced_{}", slug(self.options.model.as_str()));
        let filename = artifact_filename(&hint, &bytes, self.options.output_format.as_str());
        let url = ctx.artifacts.save(&bytes, &filename).await?;

        reporter.status("Enhancement complete").await;
        reporter.progress(100).await;
        info!(%url, "enhance node finished");
        Ok(NodeOutput::artifact(url))
    }
}

/// Generative enhancement. Unlike the standard nodes this one waits on
/// a remote render job, so a run can take minutes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CreativeEnhanceNode {
    #[serde(default)]
    pub options: CreativeOptions,
}

impl CreativeEnhanceNode {
    pub fn param_specs() -> Vec<ParamSpec> {
        CreativeOptions::param_specs()
    }

    pub async fn run(&self, ctx: &NodeContext, image: Vec<u8>) -> NodeResult<NodeOutput> {
        let reporter = ctx.reporter(false);
        let result = self.run_inner(ctx, &reporter, image).await;
        if let Err(err) = &result {
            reporter.status(&err.to_string()).await;
        }
        result
    }

    async fn run_inner(
        &self,
        ctx: &NodeContext,
        reporter: &crate::context::StatusReporter,
        image: Vec<u8>,
    ) -> NodeResult<NodeOutput> {
        self.options.validate()?;
        let client = ctx.client().await?;

        reporter
            .status(&format!(
                "Rendering with {} (this may take a few minutes)",
                self.options.model
            ))
            .await;
        let bytes = client.enhance_gen(image, &self.options).await?;

        let hint = format!("generated_{}", slug(self.options.model.as_str()));
        let filename = artifact_filename(&hint, &bytes, self.options.output_format.as_str());
        let url = ctx.artifacts.save(&bytes, &filename).await?;

        reporter.status("Render complete").await;
        reporter.progress(100).await;
        info!(%url, "creative enhance node finished");
        Ok(NodeOutput::artifact(url))
    }
}
