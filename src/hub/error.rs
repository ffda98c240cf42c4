//! Failures surfaced to clients as `error` events.

use thiserror::Error;

/// Validation and addressing failures for one client event. The display
/// string is exactly what the offending client receives.
///
/// Anything else that goes wrong while handling an event is logged and
/// swallowed; no fault takes the connection or the process down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// The named room is not in the configured set.
    #[error("Invalid room.")]
    InvalidRoom(String),
    /// A private message arrived without a target display name.
    #[error("No target user specified.")]
    NoTargetSpecified,
    /// No connection carries the target display name.
    #[error("User {0} not found.")]
    TargetNotFound(String),
}
