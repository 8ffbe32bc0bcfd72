//! Asynchronous video jobs: create, upload, poll, download.
//!
//! The remote flow is create -> accept -> PUT to presigned URL ->
//! complete-upload -> poll status -> download. Each step is exposed on
//! its own for callers that drive the flow themselves;
//! `run_to_completion` strings them together with progress reporting
//! and cooperative cancellation.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use topaz_models::{Filter, OutputSettings, ProcessingJob, SourceInfo, VideoJobStatus};

use crate::cancel::CancelToken;
use crate::client::TopazClient;
use crate::error::{ClientError, ClientResult};
use crate::progress::ProgressSink;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateVideoRequest<'a> {
    source: &'a SourceInfo,
    output: &'a OutputSettings,
    filters: &'a [Filter],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVideoResponse {
    request_id: Option<String>,
}

/// Upload slots issued by the accept step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptResponse {
    #[serde(default)]
    pub upload_id: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteUploadRequest {
    upload_results: Vec<UploadResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResult {
    part_num: u32,
    e_tag: String,
}

/// One status poll as the server reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoStatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub download: Option<DownloadInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadInfo {
    #[serde(default)]
    pub url: Option<String>,
}

impl TopazClient {
    /// Register a new video job. Returns the server-issued request id.
    pub async fn create_request(
        &self,
        source: &SourceInfo,
        output: &OutputSettings,
        filters: &[Filter],
    ) -> ClientResult<String> {
        let url = format!("{}/", self.config.video_base_url);
        let body = CreateVideoRequest {
            source,
            output,
            filters,
        };
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest("creating video request", e))?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let created: CreateVideoResponse = response
            .json()
            .await
            .map_err(|e| ClientError::protocol(format!("unparseable create response: {e}")))?;
        let request_id = created
            .request_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClientError::protocol("create response missing requestId"))?;
        info!(request_id = %request_id, "video request created");
        Ok(request_id)
    }

    /// Confirm the job and obtain presigned upload URLs. An empty URL
    /// list is a protocol violation; no upload is attempted.
    pub async fn accept(&self, request_id: &str) -> ClientResult<AcceptResponse> {
        let url = format!("{}/{}/accept", self.config.video_base_url, request_id);
        let response = self
            .http
            .patch(&url)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest("accepting video request", e))?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let accept: AcceptResponse = response
            .json()
            .await
            .map_err(|e| ClientError::protocol(format!("unparseable accept response: {e}")))?;
        if accept.urls.is_empty() {
            return Err(ClientError::protocol(
                "accept response contained no upload URLs",
            ));
        }
        debug!(request_id, urls = accept.urls.len(), "upload slots issued");
        Ok(accept)
    }

    /// PUT the source bytes to a presigned URL. Returns the ETag the
    /// storage backend issued for the part.
    pub async fn upload(&self, presigned_url: &str, data: Vec<u8>) -> ClientResult<String> {
        let size = data.len();
        let response = self
            .http
            .put(presigned_url)
            .timeout(self.config.download_timeout)
            .body(data)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest("uploading video data", e))?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ClientError::protocol(
                    "upload response missing ETag; data may have landed but cannot be confirmed",
                )
            })?;
        debug!(size, etag = %etag, "upload part confirmed");
        Ok(etag)
    }

    /// Tell the server the upload is finished, quoting the part's ETag.
    pub async fn complete_upload(&self, request_id: &str, etag: &str) -> ClientResult<()> {
        let url = format!(
            "{}/{}/complete-upload",
            self.config.video_base_url, request_id
        );
        let body = CompleteUploadRequest {
            upload_results: vec![UploadResult {
                part_num: 1,
                e_tag: etag.to_string(),
            }],
        };
        let response = self
            .http
            .patch(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest("completing upload", e))?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        info!(request_id, "upload completed, processing started");
        Ok(())
    }

    /// Fetch the current job status.
    pub async fn status(&self, request_id: &str) -> ClientResult<VideoStatusResponse> {
        let url = format!("{}/{}/status", self.config.video_base_url, request_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest("fetching video status", e))?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::protocol(format!("unparseable status response: {e}")))
    }

    /// Download result bytes from a URL the server handed out.
    pub async fn download(&self, url: &str) -> ClientResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .timeout(self.config.download_timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest("downloading result", e))?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest("reading result body", e))?;
        Ok(bytes.to_vec())
    }

    /// Drive a whole video job and return the processed bytes alongside
    /// the final job state.
    ///
    /// Progress goes to `sink` clamped and monotonic non-decreasing; the
    /// polling loop always terminates within `max_wait + poll_interval`
    /// of wall clock, whatever the server does. There are no retries:
    /// every failure surfaces to the caller as-is.
    pub async fn run_to_completion(
        &self,
        source: &SourceInfo,
        output: &OutputSettings,
        filters: &[Filter],
        data: Vec<u8>,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> ClientResult<(ProcessingJob, Vec<u8>)> {
        let request_id = self.create_request(source, output, filters).await?;
        let mut job = ProcessingJob::new(request_id.clone());

        job.set_status(VideoJobStatus::Uploading);
        let accept = self.accept(&request_id).await?;
        let etag = self.upload(&accept.urls[0], data).await?;
        job.set_status(VideoJobStatus::Uploaded);
        self.complete_upload(&request_id, &etag).await?;
        job.set_status(VideoJobStatus::Processing);

        self.poll_until_complete(&mut job, sink, cancel).await?;

        let download_url = job
            .download_url
            .clone()
            .ok_or_else(|| ClientError::protocol("job complete but no download URL provided"))?;

        self.report_if_advanced(&mut job, sink, 90, "Downloading result")
            .await;
        let bytes = self.download(&download_url).await?;
        self.report_if_advanced(&mut job, sink, 100, "Done").await;

        info!(request_id = %job.request_id, size = bytes.len(), "video job complete");
        Ok((job, bytes))
    }

    async fn poll_until_complete(
        &self,
        job: &mut ProcessingJob,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> ClientResult<()> {
        let started = Instant::now();
        let deadline = started + self.config.max_wait;

        loop {
            if cancel.is_cancelled() {
                return Err(ClientError::Cancelled(format!(
                    "job {} cancelled while processing",
                    job.request_id
                )));
            }

            let remote = self.status(&job.request_id).await?;
            let status = VideoJobStatus::from_remote(remote.status.as_deref().unwrap_or(""));
            job.set_status(status);

            match status {
                VideoJobStatus::Failed => {
                    let message = remote
                        .message
                        .unwrap_or_else(|| "video processing failed".to_string());
                    warn!(request_id = %job.request_id, %message, "job failed remotely");
                    return Err(ClientError::remote(200, message));
                }
                VideoJobStatus::Complete => {
                    job.download_url = remote.download.and_then(|d| d.url);
                    return Ok(());
                }
                _ => {
                    let pct = match remote.progress {
                        Some(p) => p.clamp(0.0, 100.0) as u8,
                        // No remote figure: approximate from elapsed time,
                        // never claiming the job is nearly done.
                        None => {
                            let fraction = started.elapsed().as_secs_f64()
                                / self.config.max_wait.as_secs_f64();
                            ((fraction * 100.0) as u8).min(99)
                        }
                    };
                    let message = remote
                        .message
                        .unwrap_or_else(|| format!("Processing ({pct}%)"));
                    self.report_if_advanced(job, sink, pct, &message).await;
                }
            }

            if Instant::now() >= deadline {
                return Err(ClientError::timeout(format!(
                    "job {} still {} after {:?}",
                    job.request_id,
                    job.status,
                    self.config.max_wait
                )));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Record progress on the job and forward it only when it actually
    /// moved, so the sink sees a strictly increasing sequence.
    async fn report_if_advanced(
        &self,
        job: &mut ProcessingJob,
        sink: &dyn ProgressSink,
        pct: u8,
        message: &str,
    ) {
        let before = job.progress;
        job.set_progress(pct);
        if job.progress > before {
            sink.report(job.progress, message).await;
        }
    }
}
