//! In-memory artifact repository for testing.
//!
//! This adapter is for **testing only**. It uses `.expect()` on lock
//! operations which will panic if locks are poisoned.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::artifact::{ArtifactIdentifier, RepositoryMatch};
use crate::ports::{ArtifactRepository, RepositoryQueryError};

/// In-memory artifact repository.
///
/// Features:
/// - Matches stored per identifier
/// - Query capture for assertions
/// - Failure injection
///
/// # Example
///
/// ```ignore
/// let repo = InMemoryArtifactRepository::new("https://af.example.com");
/// repo.store(identifier.clone(), RepositoryMatch::new("repo", "path", "a.jar"));
///
/// assert_eq!(repo.find(&identifier).await?.len(), 1);
/// assert_eq!(repo.query_count(), 1);
/// ```
pub struct InMemoryArtifactRepository {
    base_url: String,
    stored: RwLock<HashMap<ArtifactIdentifier, Vec<RepositoryMatch>>>,
    queries: RwLock<Vec<ArtifactIdentifier>>,
    failure: RwLock<Option<RepositoryQueryError>>,
}

impl InMemoryArtifactRepository {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stored: RwLock::new(HashMap::new()),
            queries: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
        }
    }

    /// Adds a match returned for `identifier`.
    pub fn store(&self, identifier: ArtifactIdentifier, found: RepositoryMatch) {
        self.stored
            .write()
            .expect("InMemoryArtifactRepository: stored lock poisoned")
            .entry(identifier)
            .or_default()
            .push(found);
    }

    /// Makes every following search fail with `error`.
    pub fn fail_with(&self, error: RepositoryQueryError) {
        *self
            .failure
            .write()
            .expect("InMemoryArtifactRepository: failure lock poisoned") = Some(error);
    }

    // === Test Helpers ===

    /// Identifiers searched for, in order.
    pub fn queries(&self) -> Vec<ArtifactIdentifier> {
        self.queries
            .read()
            .expect("InMemoryArtifactRepository: queries lock poisoned")
            .clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries
            .read()
            .expect("InMemoryArtifactRepository: queries lock poisoned")
            .len()
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifactRepository {
    async fn find(
        &self,
        identifier: &ArtifactIdentifier,
    ) -> Result<Vec<RepositoryMatch>, RepositoryQueryError> {
        self.queries
            .write()
            .expect("InMemoryArtifactRepository: queries lock poisoned")
            .push(identifier.clone());

        if let Some(error) = self
            .failure
            .read()
            .expect("InMemoryArtifactRepository: failure lock poisoned")
            .clone()
        {
            return Err(error);
        }

        Ok(self
            .stored
            .read()
            .expect("InMemoryArtifactRepository: stored lock poisoned")
            .get(identifier)
            .cloned()
            .unwrap_or_default())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
