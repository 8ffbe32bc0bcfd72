//! Progress reporting hooks.

use async_trait::async_trait;

/// Receives progress updates from long-running operations.
///
/// Implementations should be fast; the client awaits each report
/// inline between protocol steps.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// `percent` is already clamped to `[0, 100]` and non-decreasing
    /// for the lifetime of one job.
    async fn report(&self, percent: u8, message: &str);
}

/// Sink that discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressSink for NoopProgress {
    async fn report(&self, _percent: u8, _message: &str) {}
}
