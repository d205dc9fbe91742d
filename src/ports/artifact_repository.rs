//! ArtifactRepository port - Interface for confirming stored artifacts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::artifact::{ArtifactIdentifier, RepositoryMatch};
use crate::domain::foundation::{DomainError, ErrorCode};

/// The repository could not be asked, or its answer could not be read.
///
/// A repository that answers with an error status is not a query error;
/// adapters report that as "no match".
#[derive(Debug, Clone, Error)]
pub enum RepositoryQueryError {
    /// Connection refused, reset, DNS failure and the like.
    #[error("repository unreachable: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("repository query timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// A success response whose body is not a search result.
    #[error("invalid repository response: {0}")]
    InvalidResponse(String),
}

impl From<RepositoryQueryError> for DomainError {
    fn from(err: RepositoryQueryError) -> Self {
        DomainError::new(ErrorCode::RepositoryQueryFailed, err.to_string())
    }
}

/// Port for searching the binary repository.
///
/// Zero matches is an ordinary answer: the ArtifactCreated announcement
/// often races ahead of the upload.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Every stored artifact matching `identifier`.
    async fn find(
        &self,
        identifier: &ArtifactIdentifier,
    ) -> Result<Vec<RepositoryMatch>, RepositoryQueryError>;

    /// Base URL that match locations are relative to.
    fn base_url(&self) -> &str;
}
