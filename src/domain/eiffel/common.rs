//! Building blocks shared by inbound and outbound Eiffel events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::EventId;

/// `meta.source`: who sent the event. Every member is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub domain_id: Option<String>,
    pub host: Option<String>,
    pub name: Option<String>,
    pub serializer: Option<String>,
    pub uri: Option<String>,
}

impl Source {
    /// A source identified by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Eiffel link types used by this bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
    /// Points an ArtifactPublished event at its ArtifactCreated event.
    Artifact,
}

/// A typed reference to another event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub target: EventId,
}

impl Link {
    pub fn artifact(target: EventId) -> Self {
        Self {
            link_type: LinkType::Artifact,
            target,
        }
    }
}

/// Kind of store a published artifact can be fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Artifactory,
    Nexus,
    Plain,
    Other,
}

/// Where a published artifact can be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub uri: String,
    pub name: Option<String>,
}

impl Location {
    /// An Artifactory location.
    pub fn artifactory(uri: impl Into<String>) -> Self {
        Self {
            location_type: LocationType::Artifactory,
            uri: uri.into(),
            name: None,
        }
    }
}
