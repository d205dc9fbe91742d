//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus for testing
//!
//! The production bus lives in `adapters::rabbitmq`.

mod in_memory;

pub use in_memory::InMemoryEventBus;
