//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `artifactory` - Artifact search over the Artifactory AQL API
//! - `events` - In-memory event bus for tests
//! - `rabbitmq` - AMQP consumer and publisher

pub mod artifactory;
pub mod events;
pub mod rabbitmq;

pub use artifactory::{ArtifactoryClient, InMemoryArtifactRepository};
pub use events::InMemoryEventBus;
pub use rabbitmq::{RabbitMqConnection, RabbitMqPublisher, RabbitMqSubscription, RetryPolicy};
