//! The consume loop.
//!
//! Deliveries are handled one at a time. Every delivery is acknowledged
//! after its handler returns, whatever the outcome; a failed message is
//! logged, never redelivered. A shutdown signal stops the loop between
//! deliveries, so an in-flight message always finishes.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use lapin::message::Delivery;
use lapin::options::BasicAckOptions;
use tokio::sync::watch;

use super::body::decode_body;
use super::error::BusError;
use crate::domain::foundation::Severity;
use crate::ports::EventHandler;

/// A received message that can be acknowledged once.
#[async_trait]
pub trait InboundDelivery: Send {
    fn body(&self) -> &[u8];

    async fn ack(self) -> Result<(), BusError>;
}

#[async_trait]
impl InboundDelivery for Delivery {
    fn body(&self) -> &[u8] {
        &self.data
    }

    async fn ack(self) -> Result<(), BusError> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| BusError::Ack(e.to_string()))
    }
}

/// Counters for one run of the consume loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumeStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Feeds deliveries to `handler` until shutdown is signalled.
///
/// Returns `Ok` on shutdown (or when the shutdown sender is dropped) and
/// `Err` when the delivery stream fails or ends on its own.
pub async fn consume<S, D, E>(
    deliveries: S,
    handler: Arc<dyn EventHandler>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<ConsumeStats, BusError>
where
    S: Stream<Item = Result<D, E>>,
    D: InboundDelivery,
    E: Display,
{
    futures::pin_mut!(deliveries);
    let mut stats = ConsumeStats::default();

    if *shutdown.borrow() {
        return Ok(stats);
    }

    tracing::info!(handler = handler.name(), "Consuming events");

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!(
                        delivered = stats.delivered,
                        failed = stats.failed,
                        "Shutdown requested, consumer stopped"
                    );
                    return Ok(stats);
                }
            }

            next = deliveries.next() => {
                let delivery = match next {
                    Some(Ok(delivery)) => delivery,
                    Some(Err(e)) => return Err(BusError::Delivery(e.to_string())),
                    None => return Err(BusError::ConsumerClosed),
                };

                stats.delivered += 1;
                if !dispatch(handler.as_ref(), delivery.body()).await {
                    stats.failed += 1;
                }
                delivery.ack().await?;
            }
        }
    }
}

/// Decodes and handles one body. Returns whether it was handled cleanly.
async fn dispatch(handler: &dyn EventHandler, body: &[u8]) -> bool {
    let message = match decode_body(body) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "Discarding undecodable message");
            return false;
        }
    };

    match handler.handle(message).await {
        Ok(()) => true,
        Err(e) => {
            match e.severity() {
                Severity::Warning => tracing::warn!(
                    handler = handler.name(),
                    code = %e.code,
                    details = ?e.details,
                    "Message skipped: {}",
                    e.message
                ),
                Severity::Error => tracing::error!(
                    handler = handler.name(),
                    code = %e.code,
                    details = ?e.details,
                    "Message handling failed: {}",
                    e.message
                ),
            }
            false
        }
    }
}
