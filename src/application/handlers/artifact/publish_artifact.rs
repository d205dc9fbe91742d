//! PublishArtifactHandler - Turns ArtifactCreated announcements into
//! ArtifactPublished events once the artifact is found in the repository.
//!
//! Per message:
//! 1. Decode the inbound event (shape errors drop the message)
//! 2. Filter on event type and trusted sender (others are ignored silently)
//! 3. Parse `data.identity` into file name and build path
//! 4. Search the repository
//! 5. Exactly one match: publish an ArtifactPublished event linking back
//!    to the inbound event. No match: nothing to do. Several: anomaly.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::artifact::{ArtifactIdentifier, PurlFormat, RepositoryMatch};
use crate::domain::eiffel::{ArtifactPublishedEvent, EventFilter, InboundEvent, Location};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ArtifactRepository, EventHandler, EventPublisher};
use crate::telemetry::{ARTIFACTS, PUBLISHED, RECEIVED};

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Not an ArtifactCreated event, or not from a trusted sender.
    Ignored,
    /// The repository does not (yet) hold the artifact.
    NotFound,
    /// An ArtifactPublished event was put on the bus.
    Published(ArtifactPublishedEvent),
}

/// Handles ArtifactCreated events.
pub struct PublishArtifactHandler {
    filter: EventFilter,
    repository: Arc<dyn ArtifactRepository>,
    publisher: Arc<dyn EventPublisher>,
    purl_format: PurlFormat,
    source_name: String,
}

impl PublishArtifactHandler {
    pub fn new(
        filter: EventFilter,
        repository: Arc<dyn ArtifactRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            filter,
            repository,
            publisher,
            purl_format: PurlFormat::default(),
            source_name: crate::domain::eiffel::DEFAULT_SOURCE_NAME.to_string(),
        }
    }

    /// Sets the expected `data.identity` layout.
    pub fn with_purl_format(mut self, format: PurlFormat) -> Self {
        self.purl_format = format;
        self
    }

    /// Sets `meta.source.name` of published events.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Runs the pipeline for one decoded message.
    ///
    /// # Errors
    ///
    /// - `InvalidEvent` - the message is not an Eiffel event
    /// - `MalformedIdentifier` - `data.identity` is missing or unparseable
    /// - `RepositoryQueryFailed` - the repository could not be searched
    /// - `AmbiguousMatch` - more than one stored artifact matched
    /// - `PublishFailed` - the event could not be put on the bus
    pub async fn process(&self, message: Value) -> Result<PipelineOutcome, DomainError> {
        let event = InboundEvent::from_value(message.clone())?;

        if !self.filter.should_process(&event) {
            tracing::trace!(
                event_id = %event.id(),
                event_type = event.event_type(),
                "Event ignored"
            );
            return Ok(PipelineOutcome::Ignored);
        }

        tracing::info!(
            target: RECEIVED,
            event_id = %event.id(),
            source = event.source_name().unwrap_or("-"),
            event = %message,
            "ArtifactCreated event received"
        );

        let identifier = self.identifier_of(&event)?;
        let matches = self.repository.find(&identifier).await?;

        let found = match matches.as_slice() {
            [] => {
                tracing::debug!(
                    target: ARTIFACTS,
                    event_id = %event.id(),
                    filename = identifier.filename(),
                    build_path = identifier.build_path(),
                    "Artifact not found in repository"
                );
                return Ok(PipelineOutcome::NotFound);
            }
            [found] => found,
            many => {
                for candidate in many {
                    tracing::info!(
                        target: ARTIFACTS,
                        event_id = %event.id(),
                        repo = %candidate.repo,
                        path = %candidate.path,
                        name = %candidate.name,
                        "Artifact candidate"
                    );
                }
                tracing::error!(
                    target: ARTIFACTS,
                    event_id = %event.id(),
                    count = many.len(),
                    filename = identifier.filename(),
                    build_path = identifier.build_path(),
                    "AQL query returned {} artifacts, expected one",
                    many.len()
                );
                return Err(DomainError::ambiguous_match(many.len())
                    .with_detail("event_id", event.id().as_str())
                    .with_detail("filename", identifier.filename())
                    .with_detail("build_path", identifier.build_path()));
            }
        };

        let published = self.publish(&event, found).await?;
        Ok(PipelineOutcome::Published(published))
    }

    fn identifier_of(&self, event: &InboundEvent) -> Result<ArtifactIdentifier, DomainError> {
        let identity = event.identity().ok_or_else(|| {
            DomainError::new(ErrorCode::MalformedIdentifier, "event has no data.identity")
                .with_detail("event_id", event.id().as_str())
        })?;

        ArtifactIdentifier::parse(identity, self.purl_format).map_err(|e| {
            DomainError::from(e).with_detail("event_id", event.id().as_str())
        })
    }

    async fn publish(
        &self,
        event: &InboundEvent,
        found: &RepositoryMatch,
    ) -> Result<ArtifactPublishedEvent, DomainError> {
        let uri = found.location_uri(self.repository.base_url());

        tracing::info!(
            target: ARTIFACTS,
            event_id = %event.id(),
            repo = %found.repo,
            path = %found.path,
            name = %found.name,
            "Artifact found in repository"
        );

        let published = ArtifactPublishedEvent::new(
            event.id().clone(),
            vec![Location::artifactory(uri)],
            &self.source_name,
        )?;
        let payload = published.to_wire()?;

        self.publisher.publish(&payload).await?;

        tracing::info!(target: PUBLISHED, event = %payload, "ArtifactPublished event sent");

        Ok(published)
    }
}

#[async_trait]
impl EventHandler for PublishArtifactHandler {
    /// Errors are returned unlogged; the consume loop reports them.
    async fn handle(&self, message: Value) -> Result<(), DomainError> {
        self.process(message).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "PublishArtifactHandler"
    }
}
