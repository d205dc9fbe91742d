//! Artifact handlers - ArtifactCreated in, ArtifactPublished out.

mod publish_artifact;

pub use publish_artifact::{PipelineOutcome, PublishArtifactHandler};
