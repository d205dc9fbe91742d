//! Artifact identifiers extracted from Eiffel `data.identity` purls.
//!
//! Two upstream purl layouts exist:
//!
//! ```text
//! canonical:        pkg:<build_path>/artifacts/<dirs>/<filename>@<build_number>
//! build path query: pkg:<dirs>/<filename>@<build_number>?build_path=<build_path>
//! ```
//!
//! Both yield the artifact filename and a build path fingerprint that the
//! repository query matches against the build URL recorded on the artifact.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

const PURL_PREFIX: &str = "pkg:";
const ARTIFACTS_MARKER: &str = "/artifacts";
const BUILD_PATH_PARAM: &str = "?build_path=";

/// Which purl layout the upstream sender emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurlFormat {
    /// Pick per string: `BuildPathQuery` if it carries `?build_path=`.
    #[default]
    Auto,
    /// `pkg:<build_path>/artifacts/.../<filename>@<n>`
    Canonical,
    /// `pkg:.../<filename>@<n>?build_path=<build_path>`
    BuildPathQuery,
}

impl PurlFormat {
    /// Resolves `Auto` against a concrete identity string.
    pub fn detect(self, identity: &str) -> PurlFormat {
        match self {
            PurlFormat::Auto if identity.contains(BUILD_PATH_PARAM) => PurlFormat::BuildPathQuery,
            PurlFormat::Auto => PurlFormat::Canonical,
            explicit => explicit,
        }
    }
}

/// An identity string that cannot be turned into an [`ArtifactIdentifier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedIdentifierError {
    #[error("identity '{0}' does not start with 'pkg:'")]
    MissingPrefix(String),

    #[error("identity '{0}' has no '/' before the filename")]
    MissingSeparator(String),

    #[error("identity '{0}' has an empty filename")]
    EmptyFilename(String),

    #[error("identity '{0}' has no build_path query parameter")]
    MissingBuildPath(String),

    #[error("identity '{0}' has an empty build path")]
    EmptyBuildPath(String),
}

impl From<MalformedIdentifierError> for DomainError {
    fn from(err: MalformedIdentifierError) -> Self {
        DomainError::new(ErrorCode::MalformedIdentifier, err.to_string())
    }
}

/// Filename and build fingerprint of an announced artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactIdentifier {
    filename: String,
    build_path: String,
}

impl ArtifactIdentifier {
    /// Creates an identifier from already-split parts.
    pub fn new(filename: impl Into<String>, build_path: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            build_path: build_path.into(),
        }
    }

    /// Parses an Eiffel `data.identity` purl using the given layout.
    pub fn parse(identity: &str, format: PurlFormat) -> Result<Self, MalformedIdentifierError> {
        match format.detect(identity) {
            PurlFormat::BuildPathQuery => parse_build_path_query(identity),
            _ => parse_canonical(identity),
        }
    }

    /// The artifact's file name, without the `@<build>` suffix.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Substring of the producing build's URL.
    pub fn build_path(&self) -> &str {
        &self.build_path
    }
}

/// `pkg:<segments>/<filename>@<n>`; the fingerprint is everything before
/// the first `/artifacts` marker, or all segments when there is none.
pub fn parse_canonical(identity: &str) -> Result<ArtifactIdentifier, MalformedIdentifierError> {
    let body = strip_prefix(identity)?;
    let (segments, last) = body
        .rsplit_once('/')
        .ok_or_else(|| MalformedIdentifierError::MissingSeparator(identity.to_string()))?;

    let filename = filename_of(last, identity)?;

    let build_path = match segments.find(ARTIFACTS_MARKER) {
        Some(idx) => &segments[..idx],
        None => segments,
    };
    if build_path.is_empty() {
        return Err(MalformedIdentifierError::EmptyBuildPath(identity.to_string()));
    }

    Ok(ArtifactIdentifier::new(filename, build_path))
}

/// `pkg:<dirs>/<filename>@<n>?build_path=<path>`.
pub fn parse_build_path_query(
    identity: &str,
) -> Result<ArtifactIdentifier, MalformedIdentifierError> {
    let body = strip_prefix(identity)?;
    let (location, query) = body
        .split_once(BUILD_PATH_PARAM)
        .ok_or_else(|| MalformedIdentifierError::MissingBuildPath(identity.to_string()))?;

    let build_path = query.split('&').next().unwrap_or_default();
    if build_path.is_empty() {
        return Err(MalformedIdentifierError::EmptyBuildPath(identity.to_string()));
    }

    let (_, last) = location
        .rsplit_once('/')
        .ok_or_else(|| MalformedIdentifierError::MissingSeparator(identity.to_string()))?;
    let filename = filename_of(last, identity)?;

    Ok(ArtifactIdentifier::new(filename, build_path))
}

fn strip_prefix(identity: &str) -> Result<&str, MalformedIdentifierError> {
    identity
        .strip_prefix(PURL_PREFIX)
        .ok_or_else(|| MalformedIdentifierError::MissingPrefix(identity.to_string()))
}

fn filename_of<'a>(segment: &'a str, identity: &str) -> Result<&'a str, MalformedIdentifierError> {
    let filename = segment.split(['@', '?']).next().unwrap_or_default();
    if filename.is_empty() {
        return Err(MalformedIdentifierError::EmptyFilename(identity.to_string()));
    }
    Ok(filename)
}
