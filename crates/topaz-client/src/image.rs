//! Synchronous image operations and the async generative flow.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};

use topaz_models::{CreativeOptions, DenoiseOptions, EnhanceOptions, ImageJobStatus};

use crate::client::TopazClient;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    process_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenStatusResponse {
    status: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadPointer {
    url: Option<String>,
}

impl TopazClient {
    /// Remove noise from an image. Returns the processed bytes.
    pub async fn denoise(&self, image: Vec<u8>, opts: &DenoiseOptions) -> ClientResult<Vec<u8>> {
        opts.validate()?;
        self.image_sync("denoise", image, opts.form_fields(), opts.output_format.mime())
            .await
    }

    /// Upscale and sharpen an image with a standard model.
    pub async fn enhance(&self, image: Vec<u8>, opts: &EnhanceOptions) -> ClientResult<Vec<u8>> {
        opts.validate()?;
        self.image_sync("enhance", image, opts.form_fields(), opts.output_format.mime())
            .await
    }

    /// Generative enhancement. Submits the job, polls until it settles,
    /// then fetches the rendered output.
    pub async fn enhance_gen(
        &self,
        image: Vec<u8>,
        opts: &CreativeOptions,
    ) -> ClientResult<Vec<u8>> {
        opts.validate()?;

        let response = self
            .post_image_form("enhance-gen", image, opts.form_fields(), "application/json")
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let submit: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ClientError::protocol(format!("unparseable submit response: {e}")))?;
        let process_id = submit
            .process_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClientError::protocol("submit response missing process_id"))?;

        info!(process_id = %process_id, model = %opts.model, "generative job submitted");

        self.poll_generative(&process_id).await?;
        self.download_generative(&process_id).await
    }

    /// Shared multipart POST for the synchronous endpoints. The response
    /// body must be an image.
    async fn image_sync(
        &self,
        endpoint: &str,
        image: Vec<u8>,
        fields: Vec<(&'static str, String)>,
        accept: &str,
    ) -> ClientResult<Vec<u8>> {
        let response = self.post_image_form(endpoint, image, fields, accept).await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ClientError::protocol(format!(
                "expected image response, got content-type {content_type:?}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest("reading image response", e))?;
        debug!(endpoint, size = bytes.len(), "image operation complete");
        Ok(bytes.to_vec())
    }

    async fn post_image_form(
        &self,
        endpoint: &str,
        image: Vec<u8>,
        fields: Vec<(&'static str, String)>,
        accept: &str,
    ) -> ClientResult<reqwest::Response> {
        let mut form = Form::new().part(
            "image",
            Part::bytes(image)
                .file_name("input.jpg")
                .mime_str("application/octet-stream")
                .map_err(|e| ClientError::config(format!("invalid mime type: {e}")))?,
        );
        for (name, value) in fields {
            form = form.text(name, value);
        }

        let url = format!("{}/{}", self.config.image_base_url, endpoint);
        debug!(%url, "posting image request");
        self.http
            .post(&url)
            .header(reqwest::header::ACCEPT, accept)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(endpoint, e))
    }

    /// Poll the generative job at the fixed interval until it completes,
    /// fails, or the wall-clock budget runs out.
    async fn poll_generative(&self, process_id: &str) -> ClientResult<()> {
        let url = format!("{}/status/{}", self.config.image_base_url, process_id);
        let deadline = Instant::now() + self.config.max_wait;

        loop {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| ClientError::from_reqwest("polling generative status", e))?;
            if !response.status().is_success() {
                return Err(Self::error_from_response(response).await);
            }
            let body: GenStatusResponse = response
                .json()
                .await
                .map_err(|e| ClientError::protocol(format!("unparseable status response: {e}")))?;

            let status = ImageJobStatus::from_remote(body.status.as_deref().unwrap_or(""));
            debug!(%process_id, ?status, "generative job status");
            match status {
                ImageJobStatus::Completed => return Ok(()),
                ImageJobStatus::Failed => {
                    let message = body
                        .message
                        .unwrap_or_else(|| "generative job failed".to_string());
                    return Err(ClientError::remote(200, message));
                }
                ImageJobStatus::Pending => {}
            }

            if Instant::now() >= deadline {
                return Err(ClientError::timeout(format!(
                    "generative job {process_id} did not finish within {:?}",
                    self.config.max_wait
                )));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Fetch the rendered output. The endpoint returns either the image
    /// bytes directly or a JSON pointer to a presigned URL.
    async fn download_generative(&self, process_id: &str) -> ClientResult<Vec<u8>> {
        let url = format!("{}/download/{}", self.config.image_base_url, process_id);
        let response = self
            .http
            .get(&url)
            .timeout(self.config.download_timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest("downloading generative output", e))?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.starts_with("image/") {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ClientError::from_reqwest("reading generative output", e))?;
            return Ok(bytes.to_vec());
        }

        let pointer: DownloadPointer = response
            .json()
            .await
            .map_err(|e| ClientError::protocol(format!("unparseable download response: {e}")))?;
        let presigned = pointer
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ClientError::protocol("download response missing url"))?;
        self.download(&presigned).await
    }
}
