//! Error types for the hash ring.

use thiserror::Error;

/// Result type alias for the hash ring.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building or querying a ring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A key was looked up while no node is active.
    #[error("ring is empty: no active nodes")]
    EmptyRing,
    /// Replica factor must be at least one virtual node per node.
    #[error("invalid replica factor {0}: must be greater than zero")]
    InvalidReplicaFactor(u32),
    /// Configuration failed validation.
    #[error("invalid ring configuration: {0}")]
    Config(String),
}
