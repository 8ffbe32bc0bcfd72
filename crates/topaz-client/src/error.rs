//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Classification of a remote API failure by status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// 401: credential rejected
    Auth,
    /// 429: rate limit exceeded
    RateLimit,
    /// 5xx: server-side failure
    Server,
    /// Any other 4xx, or a job the server reports as failed
    Api,
}

impl std::fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RemoteErrorKind::Auth => "Authentication failed",
            RemoteErrorKind::RateLimit => "Rate limit exceeded",
            RemoteErrorKind::Server => "Server error",
            RemoteErrorKind::Api => "API error",
        };
        write!(f, "{s}")
    }
}

/// Errors that can occur while talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    InvalidParameter(#[from] topaz_models::ParamError),

    /// The response was missing a field the protocol requires.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// The API reported a failure.
    #[error("{kind} ({status}): {message}")]
    Remote {
        status: u16,
        kind: RemoteErrorKind,
        message: String,
    },

    /// A single request or the whole-job polling budget ran out.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Connection-level failure, distinct from an API-reported one.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The caller's cancellation token fired between polls.
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl ClientError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Classify a non-2xx response with the server-reported message.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 => RemoteErrorKind::Auth,
            429 => RemoteErrorKind::RateLimit,
            s if s >= 500 => RemoteErrorKind::Server,
            _ => RemoteErrorKind::Api,
        };
        Self::Remote {
            status,
            kind,
            message: message.into(),
        }
    }

    /// Map a reqwest failure, keeping request timeouts distinct from
    /// socket-level errors.
    pub fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: request timed out"))
        } else {
            Self::Transport(format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        match ClientError::remote(401, "bad key") {
            ClientError::Remote { kind, .. } => assert_eq!(kind, RemoteErrorKind::Auth),
            other => panic!("unexpected: {other:?}"),
        }
        match ClientError::remote(429, "slow down") {
            ClientError::Remote { kind, .. } => assert_eq!(kind, RemoteErrorKind::RateLimit),
            other => panic!("unexpected: {other:?}"),
        }
        match ClientError::remote(503, "oops") {
            ClientError::Remote { kind, .. } => assert_eq!(kind, RemoteErrorKind::Server),
            other => panic!("unexpected: {other:?}"),
        }
        match ClientError::remote(422, "bad field") {
            ClientError::Remote { kind, .. } => assert_eq!(kind, RemoteErrorKind::Api),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_error_messages_embed_server_text() {
        let err = ClientError::remote(500, "disk full");
        assert!(err.to_string().contains("disk full"));
        assert!(err.to_string().contains("500"));
    }
}
