//! Workflow-engine nodes for the Topaz Labs enhancement API.
//!
//! A node wires typed enhancement options to the HTTP client and to
//! three host collaborators: a [`host::SecretStore`] for the API key,
//! an [`host::ArtifactStore`] for result persistence and a
//! [`host::StatusSink`] for progress display. Hosts inject all three
//! through a [`NodeContext`]; nodes themselves stay stateless between
//! runs.

pub mod context;
pub mod error;
pub mod host;
pub mod image;
pub mod output;
pub mod video;

pub use context::{NodeContext, StatusReporter};
pub use error::{NodeError, NodeResult};
pub use host::{
    artifact_filename, resolve_api_key, ArtifactStore, DirArtifactStore, EnvSecretStore,
    MemoryStatusSink, SecretStore, StatusSink, API_KEY_SECRET,
};
pub use image::{CreativeEnhanceNode, DenoiseNode, EnhanceNode};
pub use output::NodeOutput;
pub use video::{FrameInterpolationNode, VideoDenoiseNode, VideoNodeSettings, VideoUpscaleNode};
