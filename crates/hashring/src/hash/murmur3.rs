//! MurmurHash3 x86_32.
//!
//! Austin Appleby's 32-bit variant, computed by the `murmur3` crate. This is
//! the ring's default hasher.

use crate::hash::traits::Hash32;

/// Seedable MurmurHash3 x86_32 hasher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Murmur3 {
    seed: u32,
}

impl Murmur3 {
    /// Creates a hasher with the given seed.
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Returns the seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Hash32 for Murmur3 {
    fn hash32(&self, bytes: &[u8]) -> u32 {
        murmur3_x86_32(bytes, self.seed)
    }

    fn name(&self) -> &'static str {
        "Murmur3"
    }
}

/// Hashes `data` with MurmurHash3 x86_32.
pub fn murmur3_x86_32(data: &[u8], seed: u32) -> u32 {
    let mut reader = data;
    match ::murmur3::murmur3_32(&mut reader, seed) {
        Ok(hash) => hash,
        // Reading from an in-memory slice cannot fail.
        Err(_) => unreachable!("murmur3 read from a byte slice failed"),
    }
}
