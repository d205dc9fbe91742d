//! RabbitMQ adapter errors.

use thiserror::Error;

/// Failures of the bus connection or the consume loop.
///
/// Unlike handler errors, these stop the bridge.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to connect to broker: {0}")]
    Connect(String),

    #[error("broker connection timed out after {timeout_secs}s")]
    ConnectTimeout { timeout_secs: u64 },

    /// Channel, exchange, queue or binding setup was refused.
    #[error("bus setup failed during {step}: {message}")]
    Setup { step: &'static str, message: String },

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("acknowledgement failed: {0}")]
    Ack(String),

    /// The broker cancelled the consumer or the channel went away.
    #[error("consumer stream ended")]
    ConsumerClosed,
}

impl BusError {
    pub(crate) fn setup(step: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Setup {
            step,
            message: err.to_string(),
        }
    }
}
