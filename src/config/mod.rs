//! Application configuration module
//!
//! Configuration is read from a file (INI by default, the format of the
//! classic `eiffelactory.config`) and then overlaid with environment
//! variables carrying the `EIFFELACTORY` prefix. Nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use eiffelactory::config::AppConfig;
//!
//! let config = AppConfig::load_from("eiffelactory.config").expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Consuming from {}", config.rabbitmq.queue);
//! ```

mod artifactory;
mod bridge;
mod error;
mod logging;
mod rabbitmq;

pub use artifactory::{ArtifactoryConfig, DEFAULT_AQL_SEARCH_STRING};
pub use bridge::BridgeConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use rabbitmq::RabbitMqConfig;

use config::FileFormat;
use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "EIFFELACTORY";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Broker connection, exchange, queue and retry policy
    #[serde(default)]
    pub rabbitmq: RabbitMqConfig,

    /// Artifactory search endpoint and credentials
    #[serde(default)]
    pub artifactory: ArtifactoryConfig,

    /// Trusted senders and identity format
    #[serde(default)]
    pub eiffelactory: BridgeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables only
    ///
    /// - `EIFFELACTORY__RABBITMQ__HOST=mq` -> `rabbitmq.host = mq`
    /// - `EIFFELACTORY__ARTIFACTORY__URL=...` -> `artifactory.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, overlaid with environment variables
    ///
    /// The format follows the file extension (`.toml`, `.json`, `.yaml`,
    /// `.yml`, `.ini`); anything else is read as INI.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unreadable, or if
    /// values cannot be parsed into expected types.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let file = config::File::from(path).format(file_format(path));

        let config = config::Config::builder()
            .add_source(file)
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.rabbitmq.validate()?;
        self.artifactory.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

fn file_format(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => FileFormat::Toml,
        Some("json") => FileFormat::Json,
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        _ => FileFormat::Ini,
    }
}
