//! Application handlers.
//!
//! Event handlers that orchestrate domain operations over the ports.

pub mod artifact;

pub use artifact::{PipelineOutcome, PublishArtifactHandler};
