//! RabbitMQ bus adapter.
//!
//! - `RabbitMqConnection` - Connects and hands out the subscription and publisher
//! - `RabbitMqSubscription` - Queue consumer driving an `EventHandler`
//! - `RabbitMqPublisher` - `EventPublisher` with confirms and bounded retry

mod body;
mod connection;
mod consumer;
mod error;
mod retry;

pub use body::{decode_body, BodyError};
pub use connection::{amqp_uri, RabbitMqConnection, RabbitMqPublisher, RabbitMqSubscription};
pub use consumer::{consume, ConsumeStats, InboundDelivery};
pub use error::BusError;
pub use retry::RetryPolicy;
