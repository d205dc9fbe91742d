//! Artifactory search client - Implementation of ArtifactRepository.
//!
//! Sends the rendered AQL query as `text/plain` to `<url>/api/search/aql/`
//! and reads the `results` array of the answer.
//!
//! # Status handling
//!
//! | Response                 | Result                         |
//! |--------------------------|--------------------------------|
//! | 200 with results         | the matches (possibly none)    |
//! | 200 with unreadable body | `InvalidResponse`              |
//! | any other status         | logged, no matches             |
//! | no response in time      | `Timeout`                      |
//! | connection failure       | `Transport`                    |

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::query::AqlQueryTemplate;
use crate::config::ArtifactoryConfig;
use crate::domain::artifact::{ArtifactIdentifier, RepositoryMatch};
use crate::ports::{ArtifactRepository, RepositoryQueryError};
use crate::telemetry::ARTIFACTS;

/// Path of the AQL search endpoint below the base URL.
const SEARCH_PATH: &str = "api/search/aql/";

/// Body of a successful AQL search.
#[derive(Debug, Deserialize)]
struct AqlSearchResponse {
    results: Vec<RepositoryMatch>,
}

/// Artifactory client over the AQL search API.
pub struct ArtifactoryClient {
    base_url: String,
    username: String,
    password: Secret<String>,
    template: AqlQueryTemplate,
    timeout_secs: u64,
    client: Client,
}

impl ArtifactoryClient {
    /// Creates a client from the `artifactory` configuration section.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be built (TLS backend
    /// initialisation failure).
    pub fn new(config: &ArtifactoryConfig) -> Result<Self, RepositoryQueryError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RepositoryQueryError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: Secret::new(config.password().to_string()),
            template: AqlQueryTemplate::new(config.aql_search_string.clone()),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    /// Full URL of the search endpoint.
    pub fn search_url(&self) -> String {
        format!("{}/{}", self.base_url, SEARCH_PATH)
    }

    fn request_error(&self, err: reqwest::Error) -> RepositoryQueryError {
        if err.is_timeout() {
            RepositoryQueryError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            RepositoryQueryError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ArtifactRepository for ArtifactoryClient {
    async fn find(
        &self,
        identifier: &ArtifactIdentifier,
    ) -> Result<Vec<RepositoryMatch>, RepositoryQueryError> {
        let query = self.template.render(identifier);
        tracing::debug!(target: ARTIFACTS, query = %query, "Searching Artifactory");

        let mut request = self
            .client
            .post(self.search_url())
            .header(CONTENT_TYPE, "text/plain")
            .body(query);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(self.password.expose_secret()));
        }

        let response = request.send().await.map_err(|e| self.request_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(e))?;

        if status != StatusCode::OK {
            tracing::warn!(
                target: ARTIFACTS,
                status = %status,
                body = %body,
                filename = identifier.filename(),
                "Artifactory search was not successful"
            );
            return Ok(Vec::new());
        }

        let parsed: AqlSearchResponse = serde_json::from_str(&body)
            .map_err(|e| RepositoryQueryError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            target: ARTIFACTS,
            filename = identifier.filename(),
            matches = parsed.results.len(),
            "Artifactory search finished"
        );

        Ok(parsed.results)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
