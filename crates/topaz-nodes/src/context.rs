//! Node execution context and status relay.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use topaz_client::{CancelToken, ClientConfig, ProgressSink, TopazClient};

use crate::error::NodeResult;
use crate::host::{resolve_api_key, ArtifactStore, SecretStore, StatusSink};

/// Everything a node needs from its host, bundled for injection.
#[derive(Clone)]
pub struct NodeContext {
    pub secrets: Arc<dyn SecretStore>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub status: Arc<dyn StatusSink>,
    /// Client settings minus the key; the key is resolved per run.
    pub client_config: ClientConfig,
    pub cancel: CancelToken,
}

impl NodeContext {
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        artifacts: Arc<dyn ArtifactStore>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            secrets,
            artifacts,
            status,
            client_config: ClientConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    /// Resolve the credential and build a client for one operation.
    pub async fn client(&self) -> NodeResult<TopazClient> {
        let key = resolve_api_key(self.secrets.as_ref()).await?;
        let mut config = self.client_config.clone();
        config.api_key = key;
        Ok(TopazClient::new(config)?)
    }

    /// Start a status reporter for one operation.
    pub fn reporter(&self, append: bool) -> StatusReporter {
        StatusReporter {
            sink: Arc::clone(&self.status),
            history: Mutex::new(Vec::new()),
            append,
            last_progress: AtomicU8::new(0),
        }
    }
}

/// Relays status lines and progress to the host.
///
/// Lines carry a `[HH:MM:SS]` timestamp. In append mode (long video
/// jobs) every line so far is re-sent joined with newlines, so the host
/// shows a running log; otherwise only the latest line goes out.
/// Progress is clamped to 100 and never moves backwards.
pub struct StatusReporter {
    sink: Arc<dyn StatusSink>,
    history: Mutex<Vec<String>>,
    append: bool,
    last_progress: AtomicU8,
}

impl StatusReporter {
    pub async fn status(&self, message: &str) {
        let line = format!("[{}] {}", chrono::Utc::now().format("%H:%M:%S"), message);
        let out = if self.append {
            let mut history = self.history.lock().unwrap();
            history.push(line);
            history.join("\n")
        } else {
            line
        };
        self.sink.set_status(&out).await;
    }

    pub async fn progress(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.last_progress.fetch_max(percent, Ordering::SeqCst);
        if percent > previous {
            self.sink.set_progress(percent).await;
        }
    }
}

#[async_trait]
impl ProgressSink for StatusReporter {
    async fn report(&self, percent: u8, message: &str) {
        self.status(message).await;
        self.progress(percent).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryStatusSink;

    fn reporter(sink: &Arc<MemoryStatusSink>, append: bool) -> StatusReporter {
        StatusReporter {
            sink: Arc::clone(sink) as Arc<dyn StatusSink>,
            history: Mutex::new(Vec::new()),
            append,
            last_progress: AtomicU8::new(0),
        }
    }

    #[tokio::test]
    async fn test_progress_clamped_and_monotonic() {
        let sink = Arc::new(MemoryStatusSink::default());
        let r = reporter(&sink, false);
        r.progress(50).await;
        r.progress(30).await; // ignored, would move backwards
        r.progress(200).await; // clamped to 100
        assert_eq!(*sink.progress.lock().unwrap(), vec![50, 100]);
    }

    #[tokio::test]
    async fn test_append_mode_accumulates_lines() {
        let sink = Arc::new(MemoryStatusSink::default());
        let r = reporter(&sink, true);
        r.status("Uploading").await;
        r.status("Processing").await;
        let statuses = sink.statuses.lock().unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses[1].contains("Uploading"));
        assert!(statuses[1].contains("Processing"));
        assert!(statuses[1].contains('\n'));
    }

    #[tokio::test]
    async fn test_replace_mode_sends_single_line() {
        let sink = Arc::new(MemoryStatusSink::default());
        let r = reporter(&sink, false);
        r.status("Enhancing").await;
        let statuses = sink.statuses.lock().unwrap();
        assert_eq!(statuses.len(), 1);
        assert!(!statuses[0].contains('\n'));
        // [HH:MM:SS] prefix
        assert!(statuses[0].starts_with('['));
        assert_eq!(statuses[0].find(']'), Some(9));
    }
}
