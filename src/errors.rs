//! View synchronization error hierarchy
//!
//! Programmer errors (bad view registration, bad configuration) surface as
//! `Err`. Malformed push payloads never cross the public boundary as errors:
//! the normalizer drops and logs them, [`EventError`] only names the reason.

use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration source loading or deserialization failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// View registration failures
    #[error(transparent)]
    View(#[from] ViewError),

    /// Push transport and connection lifecycle failures
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The event pump worker has stopped and no longer accepts events
    #[error("Event pump is closed")]
    PumpClosed,

    /// Unrecoverable failures
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Resource name is not declared in the catalog
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Query parameters violate a structural rule
    #[error("Invalid query for {resource}: {reason}")]
    InvalidQuery { resource: String, reason: String },

    /// Filter column is not declared by the resource adapter
    #[error("Resource {resource} does not declare filter column {column}")]
    UnknownFilterColumn { resource: String, column: String },

    /// Seed rows are inconsistent with the view they are meant to populate
    #[error("Invalid view seed: {reason}")]
    InvalidSeed { reason: String },

    /// Refresh targeted a key that is not registered
    #[error("View {0} is not registered")]
    UnknownView(String),
}

/// Reason a raw push payload was dropped by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("Event name {0:?} is not of the form <resource>:<action>")]
    MalformedName(String),

    #[error("No adapter registered for resource {0:?}")]
    UnknownResource(String),

    #[error("Unknown action {action:?} for resource {resource:?}")]
    UnknownAction { resource: String, action: String },

    #[error("Payload for {0:?} is not a JSON object")]
    NotAnObject(String),

    #[error("Payload for {0:?} carries no usable id")]
    MissingId(String),
}

impl EventError {
    /// Short label used as a metrics dimension
    pub fn reason(&self) -> &'static str {
        match self {
            EventError::MalformedName(_) => "malformed_name",
            EventError::UnknownResource(_) => "unknown_resource",
            EventError::UnknownAction { .. } => "unknown_action",
            EventError::NotAnObject(_) => "not_an_object",
            EventError::MissingId(_) => "missing_id",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Identity cannot be used for a handshake
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Transport did not complete the handshake in time
    #[error("Handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// Transport rejected the handshake
    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),

    /// Transport refused to attach an event subscription
    #[error("Failed to attach {event}: {reason}")]
    AttachFailed { event: String, reason: String },

    /// Configured retry ceiling reached
    #[error("Reconnect gave up after {0} attempts")]
    RetriesExhausted(usize),
}
