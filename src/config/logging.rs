//! Logging configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the received/artifacts/published audit logs
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Console filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit console logs as JSON
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("LOGGING__DIRECTORY"));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            level: default_level(),
            json: false,
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_level() -> String {
    "info".to_string()
}
