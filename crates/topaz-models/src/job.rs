//! Remote job state tracking.
//!
//! One [`ProcessingJob`] is owned by a single workflow run for its whole
//! lifetime; it is mutated only by polling responses and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a remote video job.
///
/// Only `Complete` and `Failed` are terminal. The remote side may introduce
/// new intermediate states at any time, so anything unrecognized is treated
/// as still processing rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoJobStatus {
    #[default]
    Created,
    Uploading,
    Uploaded,
    Processing,
    Complete,
    Failed,
}

impl VideoJobStatus {
    /// Map a remote status string onto the known enumeration.
    pub fn from_remote(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "created" => VideoJobStatus::Created,
            "uploading" => VideoJobStatus::Uploading,
            "uploaded" => VideoJobStatus::Uploaded,
            "processing" => VideoJobStatus::Processing,
            "complete" => VideoJobStatus::Complete,
            "failed" => VideoJobStatus::Failed,
            // Forward compatibility: unknown values are non-terminal
            _ => VideoJobStatus::Processing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoJobStatus::Created => "created",
            VideoJobStatus::Uploading => "uploading",
            VideoJobStatus::Uploaded => "uploaded",
            VideoJobStatus::Processing => "processing",
            VideoJobStatus::Complete => "complete",
            VideoJobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more polls expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoJobStatus::Complete | VideoJobStatus::Failed)
    }
}

impl fmt::Display for VideoJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an async generative image job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageJobStatus {
    Pending,
    Completed,
    Failed,
}

impl ImageJobStatus {
    /// Map a remote status string; unknown values are pending.
    pub fn from_remote(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "completed" => ImageJobStatus::Completed,
            "failed" => ImageJobStatus::Failed,
            _ => ImageJobStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ImageJobStatus::Completed | ImageJobStatus::Failed)
    }
}

/// In-memory state for one remote video job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingJob {
    /// Server-issued request identifier
    pub request_id: String,
    pub status: VideoJobStatus,
    /// Progress percentage (0-100, monotonic non-decreasing)
    pub progress: u8,
    /// Result location, present once the job completes
    pub download_url: Option<String>,
}

impl ProcessingJob {
    /// Create job state for a freshly submitted request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: VideoJobStatus::Created,
            progress: 0,
            download_url: None,
        }
    }

    pub fn set_status(&mut self, status: VideoJobStatus) {
        self.status = status;
    }

    /// Update progress, clamped to [0,100] and never decreasing.
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal_states() {
        assert!(VideoJobStatus::Complete.is_terminal());
        assert!(VideoJobStatus::Failed.is_terminal());
        assert!(!VideoJobStatus::Processing.is_terminal());
        assert!(!VideoJobStatus::Created.is_terminal());
    }

    #[test]
    fn test_status_from_remote_case_insensitive() {
        assert_eq!(VideoJobStatus::from_remote("Failed"), VideoJobStatus::Failed);
        assert_eq!(VideoJobStatus::from_remote("failed"), VideoJobStatus::Failed);
        assert_eq!(
            VideoJobStatus::from_remote("COMPLETE"),
            VideoJobStatus::Complete
        );
    }

    #[test]
    fn test_unknown_status_is_still_processing() {
        assert_eq!(
            VideoJobStatus::from_remote("transcoding"),
            VideoJobStatus::Processing
        );
        assert!(!VideoJobStatus::from_remote("queued-v2").is_terminal());
    }

    #[test]
    fn test_progress_clamped_and_monotonic() {
        let mut job = ProcessingJob::new("req-1");
        job.set_progress(45);
        assert_eq!(job.progress, 45);

        // Never decreases
        job.set_progress(10);
        assert_eq!(job.progress, 45);

        // Clamped to 100
        job.set_progress(200);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_image_status_from_remote() {
        assert_eq!(
            ImageJobStatus::from_remote("Completed"),
            ImageJobStatus::Completed
        );
        assert_eq!(ImageJobStatus::from_remote("Failed"), ImageJobStatus::Failed);
        assert_eq!(
            ImageJobStatus::from_remote("Processing"),
            ImageJobStatus::Pending
        );
    }
}
