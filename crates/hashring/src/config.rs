//! Ring configuration.

use crate::error::{Error, Result};
use crate::hash::{AnyHasher, HashAlgorithm};
use crate::ring::DEFAULT_REPLICA_FACTOR;
use serde::{Deserialize, Serialize};

/// Hasher selection for a configured ring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    pub algorithm: HashAlgorithm,
    pub seed: u32,
}

impl HasherConfig {
    pub fn build(&self) -> AnyHasher {
        AnyHasher::new(self.algorithm, self.seed)
    }
}

/// Configuration for a [`HashRing`](crate::HashRing).
///
/// ```
/// let config: hashring::RingConfig =
///     serde_json::from_str(r#"{ "replica_factor": 64, "hasher": { "algorithm": "xxh32" } }"#)
///         .unwrap();
/// assert_eq!(config.replica_factor, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Virtual nodes generated per node.
    pub replica_factor: u32,
    pub hasher: HasherConfig,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replica_factor: DEFAULT_REPLICA_FACTOR,
            hasher: HasherConfig::default(),
        }
    }
}

impl RingConfig {
    /// Checks the configuration for values the ring cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.replica_factor == 0 {
            return Err(Error::Config(
                "replica_factor must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
