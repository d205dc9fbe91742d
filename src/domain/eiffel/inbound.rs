//! Events received from the bus.
//!
//! Only the members the bridge reads are modelled; everything else in the
//! payload is ignored. Optional members are parsed leniently so that a
//! foreign event type never fails to decode just because its `data` has a
//! different shape.

use serde::Deserialize;
use serde_json::Value;

use super::common::Source;
use crate::domain::foundation::{DomainError, ErrorCode, EventId};

/// `meta` of a received event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundMeta {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub source: Option<Source>,
}

/// `data` members of an ArtifactCreated event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InboundData {
    #[serde(default)]
    pub identity: Option<String>,
}

/// Any Eiffel event delivered to the bridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundEvent {
    pub meta: InboundMeta,
    #[serde(default, deserialize_with = "lenient_data")]
    pub data: InboundData,
}

impl InboundEvent {
    /// Decodes a bus payload.
    ///
    /// Fails only when `meta.id` or `meta.type` is missing or mistyped.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        serde_json::from_value(value).map_err(|e| {
            DomainError::new(ErrorCode::InvalidEvent, format!("not an Eiffel event: {}", e))
        })
    }

    pub fn id(&self) -> &EventId {
        &self.meta.id
    }

    pub fn event_type(&self) -> &str {
        &self.meta.event_type
    }

    /// `meta.source.name`, if both levels are present.
    pub fn source_name(&self) -> Option<&str> {
        self.meta.source.as_ref().and_then(|s| s.name.as_deref())
    }

    /// `data.identity`, the artifact purl.
    pub fn identity(&self) -> Option<&str> {
        self.data.identity.as_deref()
    }
}

/// `data` of other event types may be anything; treat a non-matching shape
/// as "no identity" instead of a decoding failure.
fn lenient_data<'de, D>(deserializer: D) -> Result<InboundData, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}
