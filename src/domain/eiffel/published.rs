//! EiffelArtifactPublishedEvent, the event this bridge emits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{Link, LinkType, Location, Source};
use super::wire::to_wire_value;
use super::{EIFFEL_ARTIFACT_PUBLISHED_EVENT, SCHEMA_VERSION};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, Timestamp};

/// `meta` of an outbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedMeta {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub version: String,
    pub time: Timestamp,
    pub tags: Option<Vec<String>>,
    pub source: Option<Source>,
}

/// `data` of an ArtifactPublished event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPublishedData {
    pub locations: Vec<Location>,
}

/// Announces that an artifact can be fetched from the listed locations.
///
/// Always links back, via an `ARTIFACT` link, to the ArtifactCreated event
/// that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPublishedEvent {
    pub meta: PublishedMeta,
    pub links: Vec<Link>,
    pub data: ArtifactPublishedData,
}

impl ArtifactPublishedEvent {
    /// Builds an event for `artifact_created_id` with a fresh id and the
    /// current time.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if `locations` is empty.
    pub fn new(
        artifact_created_id: EventId,
        locations: Vec<Location>,
        source_name: &str,
    ) -> Result<Self, DomainError> {
        if locations.is_empty() {
            return Err(DomainError::validation(
                "locations",
                "an ArtifactPublished event needs at least one location",
            ));
        }

        let source = (!source_name.is_empty()).then(|| Source::named(source_name));

        Ok(Self {
            meta: PublishedMeta {
                id: EventId::new(),
                event_type: EIFFEL_ARTIFACT_PUBLISHED_EVENT.to_string(),
                version: SCHEMA_VERSION.to_string(),
                time: Timestamp::now(),
                tags: None,
                source,
            },
            links: vec![Link::artifact(artifact_created_id)],
            data: ArtifactPublishedData { locations },
        })
    }

    pub fn id(&self) -> &EventId {
        &self.meta.id
    }

    /// Target of the `ARTIFACT` link.
    pub fn artifact_created_id(&self) -> Option<&EventId> {
        self.links
            .iter()
            .find(|link| link.link_type == LinkType::Artifact)
            .map(|link| &link.target)
    }

    pub fn locations(&self) -> &[Location] {
        &self.data.locations
    }

    /// JSON form for the bus, with absent optional members left out.
    pub fn to_wire(&self) -> Result<Value, DomainError> {
        to_wire_value(self).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("failed to serialize ArtifactPublished event: {}", e),
            )
        })
    }

    /// Decodes an event previously produced by [`to_wire`](Self::to_wire).
    pub fn from_wire(value: Value) -> Result<Self, DomainError> {
        serde_json::from_value(value).map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidEvent,
                format!("not an ArtifactPublished event: {}", e),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::eiffel::contains_null_member;

    fn created_id() -> EventId {
        EventId::from_string("aaaaaaaa-0000-4000-8000-000000000001")
    }

    fn event() -> ArtifactPublishedEvent {
        ArtifactPublishedEvent::new(
            created_id(),
            vec![Location::artifactory("https://some.location/artifact.txt")],
            "EIFFELACTORY",
        )
        .unwrap()
    }

    #[test]
    fn meta_is_filled_in() {
        let event = event();

        assert_eq!(event.meta.event_type, "EiffelArtifactPublishedEvent");
        assert_eq!(event.meta.version, "3.0.0");
        assert_eq!(event.meta.source, Some(Source::named("EIFFELACTORY")));
        assert!(uuid::Uuid::parse_str(event.id().as_str()).is_ok());
    }

    #[test]
    fn links_back_to_artifact_created_event() {
        let event = event();

        assert_eq!(event.links.len(), 1);
        assert_eq!(event.links[0].link_type, LinkType::Artifact);
        assert_eq!(event.artifact_created_id(), Some(&created_id()));
    }

    #[test]
    fn empty_locations_are_rejected() {
        let err = ArtifactPublishedEvent::new(created_id(), vec![], "EIFFELACTORY").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn each_event_gets_a_new_id() {
        assert_ne!(event().id(), event().id());
    }

    #[test]
    fn wire_form_has_no_nulls() {
        let wire = event().to_wire().unwrap();

        assert!(!contains_null_member(&wire));
        assert!(wire["meta"].get("tags").is_none());
        assert!(wire["meta"]["source"].get("host").is_none());
        assert!(wire["data"]["locations"][0].get("name").is_none());
    }

    #[test]
    fn wire_form_without_source_name_omits_source() {
        let event = ArtifactPublishedEvent::new(
            created_id(),
            vec![Location::artifactory("https://af/r/p/n")],
            "",
        )
        .unwrap();
        let wire = event.to_wire().unwrap();

        assert!(wire["meta"].get("source").is_none());
        assert!(!contains_null_member(&wire));
    }

    #[test]
    fn wire_form_shape() {
        let event = event();
        let wire = event.to_wire().unwrap();

        assert_eq!(wire["meta"]["time"], event.meta.time.as_unix_millis());
        assert_eq!(wire["links"][0]["type"], "ARTIFACT");
        assert_eq!(wire["links"][0]["target"], created_id().as_str());
        assert_eq!(wire["data"]["locations"][0]["type"], "ARTIFACTORY");
        assert_eq!(
            wire["data"]["locations"][0]["uri"],
            "https://some.location/artifact.txt"
        );
    }

    #[test]
    fn wire_roundtrip_is_lossless() {
        let mut event = event();
        event.meta.tags = Some(vec!["nightly".into()]);
        event.data.locations[0].name = Some("artifact.txt".into());

        let back = ArtifactPublishedEvent::from_wire(event.to_wire().unwrap()).unwrap();
        assert_eq!(back, event);
    }
}
