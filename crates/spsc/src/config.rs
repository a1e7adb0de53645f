//! Buffer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How blocking operations wait once spinning stops paying off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Longest single park, in microseconds. Cancellation and disconnection
    /// are noticed within one interval.
    pub park_interval_micros: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            park_interval_micros: 500,
        }
    }
}

impl WaitConfig {
    pub fn park_interval(&self) -> Duration {
        Duration::from_micros(self.park_interval_micros)
    }
}

/// Configuration for [`channel_with_config`](crate::channel_with_config).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Number of slots. Usable capacity is `size - 1`.
    pub size: usize,
    pub wait: WaitConfig,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            size: 1024,
            wait: WaitConfig::default(),
        }
    }
}

impl BufferConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Checks the configuration for values the ring cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(Error::InvalidCapacity(self.size));
        }
        if self.wait.park_interval_micros == 0 {
            return Err(Error::Config(
                "wait.park_interval_micros must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
