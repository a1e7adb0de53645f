//! Dispatcher configuration.

use hashring::RingConfig;
use serde::{Deserialize, Serialize};
use spsc::BufferConfig;

use crate::error::{Error, Result};

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
///
/// ```
/// let config: dispatch::DispatchConfig = serde_json::from_str(
///     r#"{ "workers": 2, "ring": { "replica_factor": 32 }, "buffer": { "size": 128 } }"#,
/// )
/// .unwrap();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Workers started with the dispatcher.
    pub workers: usize,
    /// Ring that maps keys to workers.
    pub ring: RingConfig,
    /// Per-worker buffer.
    pub buffer: BufferConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            ring: RingConfig::default(),
            buffer: BufferConfig::default(),
        }
    }
}

impl DispatchConfig {
    /// Validates this configuration and the nested ring and buffer sections.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be greater than zero".to_string()));
        }
        self.ring.validate()?;
        self.buffer.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: DispatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DispatchConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_errors_surface() {
        let mut config = DispatchConfig {
            workers: 0,
            ..DispatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.workers = 1;
        config.buffer.size = 1;
        assert_eq!(
            config.validate(),
            Err(Error::Buffer(spsc::Error::InvalidCapacity(1)))
        );

        config.buffer.size = 8;
        config.ring.replica_factor = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::Ring(hashring::Error::Config(_)))
        ));
    }
}
