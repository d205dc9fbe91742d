//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and the error vocabulary shared by the
//! Eiffel and artifact modules.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, Severity};
pub use ids::EventId;
pub use timestamp::{OutOfRangeMillis, Timestamp};
