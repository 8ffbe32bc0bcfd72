//! Client configuration.
//!
//! Defaults match the hosted API's production endpoints and the timing
//! the service is tuned for. `from_env` lets deployments override
//! endpoints and budgets without code changes; the API key is always
//! read from `TOPAZ_LABS_API_KEY`.

use std::time::Duration;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "TOPAZ_LABS_API_KEY";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent in the `X-API-Key` header.
    pub api_key: String,
    /// Base URL for synchronous image endpoints.
    pub image_base_url: String,
    /// Base URL for asynchronous video endpoints.
    pub video_base_url: String,
    /// Per-request timeout for control-plane calls.
    pub request_timeout: Duration,
    /// Timeout for bulk transfers (upload and download).
    pub download_timeout: Duration,
    /// Fixed interval between status polls.
    pub poll_interval: Duration,
    /// Wall-clock budget for a whole video job.
    pub max_wait: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            image_base_url: "https://api.topazlabs.com/image/v1".to_string(),
            video_base_url: "https://api.topazlabs.com/video".to_string(),
            request_timeout: Duration::from_secs(300),
            download_timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(15),
            max_wait: Duration::from_secs(60 * 60),
        }
    }
}

impl ClientConfig {
    /// Build a config with the given key and production defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load the key and any overrides from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
            image_base_url: std::env::var("TOPAZ_IMAGE_BASE_URL")
                .unwrap_or(defaults.image_base_url),
            video_base_url: std::env::var("TOPAZ_VIDEO_BASE_URL")
                .unwrap_or(defaults.video_base_url),
            request_timeout: env_secs("TOPAZ_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            download_timeout: env_secs("TOPAZ_DOWNLOAD_TIMEOUT_SECS", defaults.download_timeout),
            poll_interval: env_secs("TOPAZ_POLL_INTERVAL_SECS", defaults.poll_interval),
            max_wait: env_secs("TOPAZ_MAX_WAIT_SECS", defaults.max_wait),
        }
    }

    /// Override the polling budget, typically from a per-job timeout
    /// parameter expressed in minutes.
    pub fn with_max_wait_minutes(mut self, minutes: u64) -> Self {
        self.max_wait = Duration::from_secs(minutes * 60);
        self
    }
}

fn env_secs(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
