//! EventHandler port - Interface for reacting to delivered bus messages.
//!
//! The bus adapter owns the consume loop and acknowledgments; handlers only
//! see decoded JSON payloads.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::DomainError;

/// Handler for processing delivered messages.
///
/// Implementations should be:
/// - **Idempotent** - Redelivery after a crash must be harmless
/// - **Bounded** - Every outbound call has a timeout; the consume loop waits
/// - **Non-fatal** - An `Err` is logged by the caller and the message is
///   still acknowledged
///
/// # Example
///
/// ```ignore
/// struct Printer;
///
/// #[async_trait]
/// impl EventHandler for Printer {
///     async fn handle(&self, message: Value) -> Result<(), DomainError> {
///         println!("{}", message);
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "Printer"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process one message.
    async fn handle(&self, message: Value) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}
