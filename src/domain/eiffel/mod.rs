//! Eiffel module - the events this bridge consumes and produces.
//!
//! - `InboundEvent` - leniently decoded bus payload
//! - `EventFilter` - which inbound events are of interest
//! - `ArtifactPublishedEvent` - outbound event, serialized via `wire`

mod common;
mod filter;
mod inbound;
mod published;
mod wire;

pub use common::{Link, LinkType, Location, LocationType, Source};
pub use filter::{is_artifact_created, EventFilter};
pub use inbound::{InboundData, InboundEvent, InboundMeta};
pub use published::{ArtifactPublishedData, ArtifactPublishedEvent, PublishedMeta};
pub use wire::{contains_null_member, strip_nulls, to_wire_value};

/// `meta.type` of events announcing a newly built artifact.
pub const EIFFEL_ARTIFACT_CREATED_EVENT: &str = "EiffelArtifactCreatedEvent";

/// `meta.type` of events announcing a stored, downloadable artifact.
pub const EIFFEL_ARTIFACT_PUBLISHED_EVENT: &str = "EiffelArtifactPublishedEvent";

/// Eiffel schema version of the events we emit.
pub const SCHEMA_VERSION: &str = "3.0.0";

/// Default `meta.source.name` of the events we emit.
pub const DEFAULT_SOURCE_NAME: &str = "EIFFELACTORY";
