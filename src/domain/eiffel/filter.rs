//! Decides which received events the bridge acts on.

use std::collections::HashSet;

use super::inbound::InboundEvent;
use super::EIFFEL_ARTIFACT_CREATED_EVENT;

/// Accepts ArtifactCreated events, optionally only from trusted senders.
///
/// The allow-list is fixed at construction; an empty list means every
/// sender is trusted.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    allowed_sources: Option<HashSet<String>>,
}

impl EventFilter {
    /// Filter that trusts every sender.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Filter that only trusts the given `meta.source.name` values.
    ///
    /// Blank entries are ignored; if nothing is left, every sender is trusted.
    pub fn with_allowed_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = sources
            .into_iter()
            .map(Into::into)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            allowed_sources: (!allowed.is_empty()).then_some(allowed),
        }
    }

    /// Whether a source allow-list is in effect.
    pub fn has_allow_list(&self) -> bool {
        self.allowed_sources.is_some()
    }

    /// True for ArtifactCreated events from a trusted sender.
    pub fn should_process(&self, event: &InboundEvent) -> bool {
        is_artifact_created(event) && self.is_from_allowed_source(event)
    }

    /// Without an allow-list every event passes. With one, the event must
    /// carry `meta.source.name` and the name must be listed.
    pub fn is_from_allowed_source(&self, event: &InboundEvent) -> bool {
        match &self.allowed_sources {
            None => true,
            Some(allowed) => event
                .source_name()
                .is_some_and(|name| allowed.contains(name)),
        }
    }
}

/// `meta.type == "EiffelArtifactCreatedEvent"`.
pub fn is_artifact_created(event: &InboundEvent) -> bool {
    event.event_type() == EIFFEL_ARTIFACT_CREATED_EVENT
}
