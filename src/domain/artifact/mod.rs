//! Artifact module - what an ArtifactCreated event points at, and what the
//! repository says about it.

mod identifier;
mod repository_match;

pub use identifier::{
    parse_build_path_query, parse_canonical, ArtifactIdentifier, MalformedIdentifierError,
    PurlFormat,
};
pub use repository_match::RepositoryMatch;
