//! HTTP client construction.

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Client for the hosted enhancement API.
///
/// Holds a connection pool and the credential; cheap to clone.
#[derive(Debug, Clone)]
pub struct TopazClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
}

impl TopazClient {
    /// Build a client. Fails before any I/O if the key is empty.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::config(
                "API key is required (set TOPAZ_LABS_API_KEY)",
            ));
        }

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ClientError::config("API key contains invalid header characters"))?;
        key.set_sensitive(true);
        headers.insert("X-API-Key", key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {e}")))?;

        debug!(
            image_base = %config.image_base_url,
            video_base = %config.video_base_url,
            "topaz client initialized"
        );

        Ok(Self { http, config })
    }

    /// Build a client from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Turn a non-success response into a classified error, pulling
    /// the server's message out of the body when there is one.
    pub(crate) async fn error_from_response(
        response: reqwest::Response,
    ) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                if body.is_empty() {
                    "no response body".to_string()
                } else {
                    body.chars().take(500).collect()
                }
            });
        ClientError::remote(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected_before_io() {
        let err = TopazClient::new(ClientConfig::default()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("TOPAZ_LABS_API_KEY"));
    }

    #[test]
    fn test_whitespace_key_rejected() {
        let err = TopazClient::new(ClientConfig::new("   ")).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_valid_key_accepted() {
        assert!(TopazClient::new(ClientConfig::new("tl-test-key")).is_ok());
    }
}
