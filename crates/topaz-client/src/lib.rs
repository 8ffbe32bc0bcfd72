//! Client for the Topaz Labs hosted enhancement API.
//!
//! Image operations are single POST/response calls; the generative
//! variant and all video operations run as remote jobs that the client
//! submits, polls at a fixed interval, and downloads on completion.
//! No call is retried: every failure aborts the current operation and
//! surfaces to the caller.

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod image;
pub mod progress;
pub mod video;

pub use cancel::CancelToken;
pub use client::TopazClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, RemoteErrorKind};
pub use progress::{NoopProgress, ProgressSink};
pub use video::{AcceptResponse, VideoStatusResponse};
