//! Node run results.

use serde::{Deserialize, Serialize};

/// What a completed node run hands back to the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeOutput {
    /// Where the result blob was persisted.
    pub artifact_url: String,
    /// Remote request id, present for video jobs so the host can
    /// correlate with the provider's dashboard.
    pub request_id: Option<String>,
}

impl NodeOutput {
    pub fn artifact(url: impl Into<String>) -> Self {
        Self {
            artifact_url: url.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Filename-safe slug for model names ("Recovery V2" -> "recovery-v2").
pub fn slug(name: &str) -> String {
    name.to_ascii_lowercase().replace([' ', '/'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_flattens_spaces() {
        assert_eq!(slug("Recovery V2"), "recovery-v2");
        assert_eq!(slug("prob-4"), "prob-4");
    }
}
