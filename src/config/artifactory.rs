//! Artifactory configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AQL query used when none is configured.
///
/// Matches the artifact by name and the producing build by a substring of
/// its URL.
pub const DEFAULT_AQL_SEARCH_STRING: &str = concat!(
    r#"items.find({"$or":[{"artifact.name":"{filename}"},{"name":"{filename}"}],"#,
    r#""artifact.module.build.url":{"$match":"*{build_path}*"}})"#,
    r#".include("name","repo","path")"#
);

/// Artifactory configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactoryConfig {
    /// Base URL, e.g. `https://artifactory.example.com/artifactory`
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default = "empty_secret")]
    password: Secret<String>,

    /// AQL template with `{filename}` and `{build_path}` placeholders
    #[serde(default = "default_aql_search_string")]
    pub aql_search_string: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ArtifactoryConfig {
    /// Exposes the password (for basic auth).
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Sets the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Secret::new(password.into());
        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate Artifactory configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("ARTIFACTORY__URL"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidArtifactoryUrl);
        }
        if !self.aql_search_string.contains("{filename}") {
            return Err(ValidationError::InvalidQueryTemplate);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("artifactory timeout_secs"));
        }
        Ok(())
    }
}

impl Default for ArtifactoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: empty_secret(),
            aql_search_string: default_aql_search_string(),
            timeout_secs: default_timeout(),
        }
    }
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_aql_search_string() -> String {
    DEFAULT_AQL_SEARCH_STRING.to_string()
}

fn default_timeout() -> u64 {
    30
}
