//! In-memory event bus implementation for testing.
//!
//! Captures published payloads and hands injected deliveries to subscribed
//! handlers, deterministically and in-process.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.
//! Production code should use the RabbitMQ adapter.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::domain::foundation::DomainError;
use crate::ports::{EventHandler, EventPublisher, PublishError};

/// In-memory event bus for testing.
///
/// Features:
/// - Payload capture for assertions
/// - Failure injection, one error per publish call
/// - Delivery of inbound messages to subscribed handlers
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.subscribe(handler);
///
/// bus.deliver(artifact_created_json).await?;
///
/// assert_eq!(bus.event_count(), 1);
/// assert!(bus.has_event("EiffelArtifactPublishedEvent"));
/// ```
pub struct InMemoryEventBus {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
    published: RwLock<Vec<Value>>,
    failures: RwLock<VecDeque<PublishError>>,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            published: RwLock::new(Vec::new()),
            failures: RwLock::new(VecDeque::new()),
        }
    }

    /// Registers a handler for delivered messages.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .expect("InMemoryEventBus: handlers write lock poisoned")
            .push(handler);
    }

    /// Hands one inbound message to every subscribed handler.
    ///
    /// All handlers run even if one fails; the first error is returned.
    pub async fn deliver(&self, message: Value) -> Result<(), DomainError> {
        // Clone handlers to release lock before await points
        let handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .expect("InMemoryEventBus: handlers lock poisoned")
            .clone();

        let mut first_error = None;
        for handler in handlers {
            if let Err(e) = handler.handle(message.clone()).await {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Makes the next publish call fail with `error`.
    ///
    /// Queued errors are consumed in order.
    pub fn fail_next(&self, error: PublishError) {
        self.failures
            .write()
            .expect("InMemoryEventBus: failures write lock poisoned")
            .push_back(error);
    }

    // === Test Helpers ===

    /// Returns all published payloads (for test assertions).
    pub fn published_events(&self) -> Vec<Value> {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .clone()
    }

    /// Returns payloads whose `meta.type` is `event_type`.
    pub fn events_of_type(&self, event_type: &str) -> Vec<Value> {
        self.published_events()
            .into_iter()
            .filter(|e| meta_type(e) == Some(event_type))
            .collect()
    }

    /// Clears all published events (for test isolation).
    pub fn clear(&self) {
        self.published
            .write()
            .expect("InMemoryEventBus: published write lock poisoned")
            .clear();
    }

    /// Returns count of published events.
    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .len()
    }

    /// Checks if an event with this `meta.type` was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .iter()
            .any(|e| meta_type(e) == Some(event_type))
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn meta_type(payload: &Value) -> Option<&str> {
    payload.pointer("/meta/type").and_then(Value::as_str)
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, payload: &Value) -> Result<(), PublishError> {
        let injected = self
            .failures
            .write()
            .expect("InMemoryEventBus: failures write lock poisoned")
            .pop_front();
        if let Some(error) = injected {
            return Err(error);
        }

        self.published
            .write()
            .expect("InMemoryEventBus: published write lock poisoned")
            .push(payload.clone());
        Ok(())
    }
}
