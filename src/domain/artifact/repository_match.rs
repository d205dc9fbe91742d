//! Rows returned by an artifact repository search.

use serde::{Deserialize, Serialize};

/// One stored artifact matching a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMatch {
    /// Repository key, e.g. `libs-release-local`.
    pub repo: String,
    /// Directory path inside the repository.
    pub path: String,
    /// File name.
    pub name: String,
}

impl RepositoryMatch {
    pub fn new(repo: impl Into<String>, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            path: path.into(),
            name: name.into(),
        }
    }

    /// Download URI of this artifact below the repository base URL.
    ///
    /// `<base_url>/<repo>/<path>/<name>`; a trailing `/` on the base is ignored.
    pub fn location_uri(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.repo,
            self.path,
            self.name
        )
    }
}
