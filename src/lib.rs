//! Eiffelactory - Eiffel event bridge for Artifactory
//!
//! Consumes `EiffelArtifactCreatedEvent`s from a RabbitMQ exchange, looks the
//! announced artifact up in Artifactory, and publishes an
//! `EiffelArtifactPublishedEvent` pointing at its download location.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
