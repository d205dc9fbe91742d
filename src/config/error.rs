//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid timeout: {0} must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("Prefetch count must be greater than zero")]
    InvalidPrefetchCount,

    #[error("Retry max interval is shorter than the start interval")]
    InvalidRetryPolicy,

    #[error("Artifactory URL must start with http:// or https://")]
    InvalidArtifactoryUrl,

    #[error("AQL search string must contain the {{filename}} placeholder")]
    InvalidQueryTemplate,
}
