//! xxHash32 hasher.

use crate::hash::traits::Hash32;

/// Seedable xxHash32 hasher backed by `xxhash-rust`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xxh32 {
    seed: u32,
}

impl Xxh32 {
    /// Creates a hasher with the given seed.
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }
}

impl Hash32 for Xxh32 {
    fn hash32(&self, bytes: &[u8]) -> u32 {
        xxhash_rust::xxh32::xxh32(bytes, self.seed)
    }

    fn name(&self) -> &'static str {
        "Xxh32"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(Xxh32::default().hash32(b""), 0x02cc_5d05);
    }
}
