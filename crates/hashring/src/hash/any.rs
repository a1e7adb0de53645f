//! Runtime-selected hasher, driven by configuration.

use crate::hash::{Hash32, Murmur3, SipHash13, Xxh32};
use serde::{Deserialize, Serialize};

/// Hash algorithms available to a configured ring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Murmur3,
    Xxh32,
    Sip13,
}

/// A hasher whose algorithm is chosen at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnyHasher {
    Murmur3(Murmur3),
    Xxh32(Xxh32),
    Sip13(SipHash13),
}

impl AnyHasher {
    /// Builds the hasher for `algorithm` seeded with `seed`.
    pub fn new(algorithm: HashAlgorithm, seed: u32) -> Self {
        match algorithm {
            HashAlgorithm::Murmur3 => AnyHasher::Murmur3(Murmur3::with_seed(seed)),
            HashAlgorithm::Xxh32 => AnyHasher::Xxh32(Xxh32::with_seed(seed)),
            HashAlgorithm::Sip13 => AnyHasher::Sip13(SipHash13::with_seed(seed)),
        }
    }
}

impl Default for AnyHasher {
    fn default() -> Self {
        AnyHasher::Murmur3(Murmur3::default())
    }
}

impl Hash32 for AnyHasher {
    fn hash32(&self, bytes: &[u8]) -> u32 {
        match self {
            AnyHasher::Murmur3(h) => h.hash32(bytes),
            AnyHasher::Xxh32(h) => h.hash32(bytes),
            AnyHasher::Sip13(h) => h.hash32(bytes),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyHasher::Murmur3(h) => h.name(),
            AnyHasher::Xxh32(h) => h.name(),
            AnyHasher::Sip13(h) => h.name(),
        }
    }
}
