//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `EventPublisher` - Put an event on the bus
//! - `EventHandler` - React to a delivered bus message
//! - `ArtifactRepository` - Search the binary repository

mod artifact_repository;
mod event_publisher;
mod event_subscriber;

pub use artifact_repository::{ArtifactRepository, RepositoryQueryError};
pub use event_publisher::{EventPublisher, PublishError};
pub use event_subscriber::EventHandler;
