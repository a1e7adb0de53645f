//! Error types for the dispatcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for dispatcher operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from building or driving a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Routing failed, typically because every worker has been removed.
    #[error(transparent)]
    Ring(#[from] hashring::Error),

    /// A worker's buffer could not be created.
    #[error(transparent)]
    Buffer(#[from] spsc::Error),

    #[error("unknown worker: {0}")]
    UnknownWorker(String),

    /// The worker's thread is gone because its handler panicked.
    #[error("worker {0} has stopped")]
    WorkerStopped(String),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),

    #[error("invalid dispatch configuration: {0}")]
    Config(String),
}

/// A non-blocking dispatch that could not enqueue. The item is handed back.
#[derive(Clone, PartialEq, Eq)]
pub enum DispatchError<T> {
    /// The chosen worker's buffer is full.
    Full { worker: String, item: T },
    /// No workers are registered.
    NoWorkers(T),
    /// The chosen worker's thread is gone.
    Stopped { worker: String, item: T },
}

impl<T> DispatchError<T> {
    /// Recovers the item that was not dispatched.
    pub fn into_inner(self) -> T {
        match self {
            DispatchError::Full { item, .. }
            | DispatchError::NoWorkers(item)
            | DispatchError::Stopped { item, .. } => item,
        }
    }
}

impl<T> fmt::Debug for DispatchError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Full { worker, .. } => write!(f, "Full {{ worker: {:?}, .. }}", worker),
            DispatchError::NoWorkers(_) => f.write_str("NoWorkers(..)"),
            DispatchError::Stopped { worker, .. } => {
                write!(f, "Stopped {{ worker: {:?}, .. }}", worker)
            }
        }
    }
}

impl<T> fmt::Display for DispatchError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Full { worker, .. } => write!(f, "buffer of {} is full", worker),
            DispatchError::NoWorkers(_) => f.write_str("no workers registered"),
            DispatchError::Stopped { worker, .. } => write!(f, "worker {} has stopped", worker),
        }
    }
}

impl<T> std::error::Error for DispatchError<T> {}
