//! Host collaborator traits.
//!
//! A node never touches the host's secret storage, artifact persistence
//! or UI directly; it goes through these narrow seams. The impls here
//! cover the common cases (process env, local directory); richer hosts
//! bring their own.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{NodeError, NodeResult};

/// Name of the secret holding the API key.
pub const API_KEY_SECRET: &str = "TOPAZ_LABS_API_KEY";

/// Read-only access to host-managed secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Option<String>;
}

/// Persists result blobs and hands back a retrievable URL.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save(&self, data: &[u8], filename: &str) -> NodeResult<String>;
}

/// Relays node status to the host UI.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn set_status(&self, line: &str);
    async fn set_progress(&self, percent: u8);
}

/// Resolve the API key, failing fast before any network I/O.
///
/// Resolved fresh on every call so a key rotated mid-session takes
/// effect on the next operation.
pub async fn resolve_api_key(secrets: &dyn SecretStore) -> NodeResult<String> {
    match secrets.get_secret(API_KEY_SECRET).await {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(NodeError::config(format!(
            "{API_KEY_SECRET} is not set; add your Topaz Labs API key to the host's secrets"
        ))),
    }
}

/// Secret store backed by process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Artifact store writing into a local directory, returning `file://`
/// URLs. Enough for tests and single-machine hosts.
#[derive(Debug, Clone)]
pub struct DirArtifactStore {
    root: PathBuf,
}

impl DirArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactStore for DirArtifactStore {
    async fn save(&self, data: &[u8], filename: &str) -> NodeResult<String> {
        let path = self.root.join(filename);
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| NodeError::artifact(format!("creating {}: {e}", self.root.display())))?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| NodeError::artifact(format!("writing {}: {e}", path.display())))?;
        debug!(path = %path.display(), size = data.len(), "artifact saved");
        Ok(format!("file://{}", path.display()))
    }
}

/// Status sink that keeps everything in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryStatusSink {
    pub statuses: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<u8>>,
}

#[async_trait]
impl StatusSink for MemoryStatusSink {
    async fn set_status(&self, line: &str) {
        self.statuses.lock().unwrap().push(line.to_string());
    }

    async fn set_progress(&self, percent: u8) {
        self.progress.lock().unwrap().push(percent);
    }
}

/// Artifact filename: `{hint}_{timestamp_ms}_{hash8}.{ext}`.
///
/// The content hash keeps names collision-free when two runs land in
/// the same millisecond.
pub fn artifact_filename(hint: &str, data: &[u8], ext: &str) -> String {
    let timestamp_ms = chrono::Utc::now().timestamp_millis();
    let digest = Sha256::digest(data);
    let hash8 = &hex::encode(digest)[..8];
    format!("{hint}_{timestamp_ms}_{hash8}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSecrets(Option<String>);

    #[async_trait]
    impl SecretStore for FixedSecrets {
        async fn get_secret(&self, _name: &str) -> Option<String> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let err = resolve_api_key(&FixedSecrets(None)).await.unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
        assert!(err.to_string().contains("TOPAZ_LABS_API_KEY"));
    }

    #[tokio::test]
    async fn test_empty_key_fails_fast() {
        let err = resolve_api_key(&FixedSecrets(Some("  ".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[tokio::test]
    async fn test_present_key_resolves() {
        let key = resolve_api_key(&FixedSecrets(Some("tl-key".to_string())))
            .await
            .unwrap();
        assert_eq!(key, "tl-key");
    }

    #[tokio::test]
    async fn test_dir_artifact_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirArtifactStore::new(dir.path());
        let url = store.save(b"payload", "out.mp4").await.unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("out.mp4"));
        let written = std::fs::read(dir.path().join("out.mp4")).unwrap();
        assert_eq!(written, b"payload");
    }

    #[test]
    fn test_artifact_filename_shape() {
        let name = artifact_filename("upscaled_prob-4_2x", b"data", "mp4");
        assert!(name.starts_with("upscaled_prob-4_2x_"));
        assert!(name.ends_with(".mp4"));
        // hint + timestamp + 8 hex chars
        let hash_part = name
            .trim_end_matches(".mp4")
            .rsplit('_')
            .next()
            .unwrap();
        assert_eq!(hash_part.len(), 8);
        assert!(hash_part.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
