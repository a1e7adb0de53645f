//! Error types for the ring buffer.
//!
//! A full or empty ring is not an error: `push` hands the value back and
//! `pop` returns `None`. The types here cover misuse and the outcomes of the
//! blocking variants.

use std::fmt;

use thiserror::Error;

/// Result type alias for the ring buffer.
pub type Result<T> = std::result::Result<T, Error>;

/// Construction and contract errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// One slot is always kept empty, so fewer than two slots hold nothing.
    #[error("invalid ring size {0}: need at least 2 slots (one is always kept empty)")]
    InvalidCapacity(usize),
    /// An operation was called in a state its contract forbids.
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),
    /// Configuration failed validation.
    #[error("invalid buffer configuration: {0}")]
    Config(String),
}

/// A blocking push that gave up. The rejected value is handed back.
#[derive(Clone, PartialEq, Eq)]
pub enum PushError<T> {
    /// The deadline passed while the ring stayed full.
    Timeout(T),
    /// The cancel token fired while the ring stayed full.
    Cancelled(T),
    /// The consumer is gone; nothing will ever drain the ring.
    Disconnected(T),
}

impl<T> PushError<T> {
    /// Recovers the value that was not pushed.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Timeout(v) | PushError::Cancelled(v) | PushError::Disconnected(v) => v,
        }
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Timeout(_) => f.write_str("Timeout(..)"),
            PushError::Cancelled(_) => f.write_str("Cancelled(..)"),
            PushError::Disconnected(_) => f.write_str("Disconnected(..)"),
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Timeout(_) => write!(f, "push timed out on a full ring"),
            PushError::Cancelled(_) => write!(f, "push cancelled on a full ring"),
            PushError::Disconnected(_) => write!(f, "push on a ring whose consumer is gone"),
        }
    }
}

impl<T> std::error::Error for PushError<T> {}

/// A blocking pop that gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PopError {
    #[error("pop timed out on an empty ring")]
    Timeout,
    #[error("pop cancelled on an empty ring")]
    Cancelled,
    /// The producer is gone and every pushed value has been popped.
    #[error("pop on a drained ring whose producer is gone")]
    Disconnected,
}
