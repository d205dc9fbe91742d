//! Bridge behaviour configuration (the `eiffelactory` section)

use serde::Deserialize;

use crate::domain::artifact::PurlFormat;
use crate::domain::eiffel::DEFAULT_SOURCE_NAME;

/// Bridge behaviour configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Trusted `meta.source.name` values (comma-separated).
    /// Empty means every sender is trusted.
    pub event_sources: Option<String>,

    /// Layout of `data.identity` purls sent upstream
    #[serde(default)]
    pub purl_format: PurlFormat,

    /// `meta.source.name` of published events
    #[serde(default = "default_source_name")]
    pub source_name: String,
}

impl BridgeConfig {
    /// Get trusted event sources as a vector
    pub fn event_sources_list(&self) -> Vec<String> {
        self.event_sources
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            event_sources: None,
            purl_format: PurlFormat::default(),
            source_name: default_source_name(),
        }
    }
}

fn default_source_name() -> String {
    DEFAULT_SOURCE_NAME.to_string()
}
