//! Node-level error types.

use thiserror::Error;

pub type NodeResult<T> = Result<T, NodeError>;

/// Errors surfaced by a node run. Each variant renders as one
/// human-readable line, suitable for a host's status display.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    InvalidParameter(#[from] topaz_models::ParamError),

    #[error(transparent)]
    Client(#[from] topaz_client::ClientError),

    #[error("Artifact store error: {0}")]
    Artifact(String),
}

impl NodeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }
}
