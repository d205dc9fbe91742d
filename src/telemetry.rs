//! Tracing subscriber setup.
//!
//! Besides the console layer, three audit logs are written under the
//! configured directory, one per event target:
//!
//! | target      | file            | level |
//! |-------------|-----------------|-------|
//! | `received`  | `received.log`  | INFO  |
//! | `artifacts` | `artifacts.log` | DEBUG |
//! | `published` | `published.log` | INFO  |

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

/// Target for accepted inbound events.
pub const RECEIVED: &str = "received";

/// Target for repository queries and their diagnostics.
pub const ARTIFACTS: &str = "artifacts";

/// Target for published events.
pub const PUBLISHED: &str = "published";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Tracing init failed: {0}")]
    Init(String),
}

/// Installs the global subscriber.
///
/// `level_override` (from the command line) beats `RUST_LOG`, which beats
/// the configured level.
pub fn init(config: &LoggingConfig, level_override: Option<&str>) -> Result<(), TelemetryError> {
    let env_filter = match level_override {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level)),
    }
    .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let console = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_filter(env_filter).boxed()
    };

    let mut layers = vec![console];
    layers.extend(audit_layers(&config.directory)?);

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))
}

/// Builds the per-target file layers, creating the directory if needed.
pub fn audit_layers(directory: &Path) -> Result<Vec<BoxedLayer>, TelemetryError> {
    std::fs::create_dir_all(directory).map_err(|source| TelemetryError::LogFile {
        path: directory.to_path_buf(),
        source,
    })?;

    Ok(vec![
        audit_layer(directory, RECEIVED, Level::INFO)?,
        audit_layer(directory, ARTIFACTS, Level::DEBUG)?,
        audit_layer(directory, PUBLISHED, Level::INFO)?,
    ])
}

fn audit_layer(directory: &Path, target: &'static str, level: Level) -> Result<BoxedLayer, TelemetryError> {
    let path = directory.join(format!("{target}.log"));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| TelemetryError::LogFile { path, source })?;

    Ok(fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(target, level))
        .boxed())
}
