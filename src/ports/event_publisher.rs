//! EventPublisher port - Interface for putting events on the bus.
//!
//! This port defines how the application publishes events without knowing
//! about the underlying transport mechanism (in-memory, RabbitMQ).

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Why an event could not be put on the bus.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// The broker refused the message or the channel failed; may succeed later.
    #[error("publish failed: {0}")]
    Transient(String),

    /// Every attempt allowed by the retry policy failed.
    #[error("publish failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Attempts made, including the first.
        attempts: u32,
        /// Error from the final attempt.
        last_error: String,
    },

    /// The payload could not be encoded for the wire.
    #[error("payload encoding failed: {0}")]
    Encoding(String),

    /// The publish channel is no longer open.
    #[error("publish channel is closed")]
    Closed,
}

impl PublishError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Whether retrying the same publish can help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<PublishError> for DomainError {
    fn from(err: PublishError) -> Self {
        DomainError::new(ErrorCode::PublishFailed, err.to_string())
    }
}

/// Port for publishing events.
///
/// Implementations must ensure:
/// - The payload is sent unchanged (already in wire form)
/// - Transient failures are retried within the adapter's bounded policy
/// - Errors are propagated to the caller once retries are exhausted
///
/// # Example
///
/// ```ignore
/// let payload = event.to_wire()?;
/// publisher.publish(&payload).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one JSON payload to the configured destination.
    async fn publish(&self, payload: &Value) -> Result<(), PublishError>;
}
