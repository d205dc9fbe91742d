//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `artifact` - Artifact identifiers and repository search results
//! - `eiffel` - Inbound/outbound Eiffel events and the inbound filter

pub mod artifact;
pub mod eiffel;
pub mod foundation;
