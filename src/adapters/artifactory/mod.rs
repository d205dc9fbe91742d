//! Artifact repository adapters.
//!
//! - `ArtifactoryClient` - AQL search over HTTP
//! - `InMemoryArtifactRepository` - Canned matches for testing

mod client;
mod in_memory;
mod query;

pub use client::ArtifactoryClient;
pub use in_memory::InMemoryArtifactRepository;
pub use query::AqlQueryTemplate;
