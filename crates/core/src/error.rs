//! Emitter error model.

use std::sync::Arc;

use thiserror::Error;

use crate::id::EventId;

/// Result type used across the emitter crates.
pub type EmitterResult<T> = Result<T, EmitterError>;

/// An error value that can be handed to many listeners at once.
///
/// Listener bodies fail with `anyhow::Error`; once such an error enters the
/// emitter (as an `"error"` event argument or an escalation) it is shared.
pub type SharedError = Arc<anyhow::Error>;

/// Coarse classification of [`EmitterError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A numeric argument was out of its accepted range.
    Range,
    /// An `"error"` event was emitted with nobody listening for it.
    Unhandled,
    /// Configuration could not be read.
    Config,
}

/// Emitter-level error.
#[derive(Debug, Error, Clone)]
pub enum EmitterError {
    /// `set_max_listeners` (or configuration) received a value that is not a
    /// non-negative integer.
    #[error("max listeners must be a non-negative integer, received {value}")]
    InvalidMaxListeners { value: String },

    /// Registration would push an event past its listener limit while the
    /// emitter rejects overflow.
    #[error("max listeners exceeded: {count} {event} listeners would exceed the limit of {max}")]
    MaxListenersExceeded {
        event: EventId,
        count: usize,
        max: usize,
    },

    /// An `"error"` event had no listener; its payload is surfaced here.
    #[error("{0}")]
    Unhandled(SharedError),

    /// Malformed configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EmitterError {
    pub fn invalid_max_listeners(value: impl ToString) -> Self {
        Self::InvalidMaxListeners {
            value: value.to_string(),
        }
    }

    pub fn max_listeners_exceeded(event: EventId, count: usize, max: usize) -> Self {
        Self::MaxListenersExceeded { event, count, max }
    }

    pub fn unhandled(error: impl Into<anyhow::Error>) -> Self {
        Self::Unhandled(Arc::new(error.into()))
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMaxListeners { .. } | Self::MaxListenersExceeded { .. } => ErrorKind::Range,
            Self::Unhandled(_) => ErrorKind::Unhandled,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// The escalated payload, if this is an unhandled `"error"` event.
    pub fn unhandled_payload(&self) -> Option<&SharedError> {
        match self {
            Self::Unhandled(err) => Some(err),
            _ => None,
        }
    }
}
