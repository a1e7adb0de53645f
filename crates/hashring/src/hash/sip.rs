//! SipHash-1-3 hasher folded to 32 bits.

use crate::hash::traits::Hash32;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// SipHash-1-3 keyed by the seed, with the 64-bit digest folded to 32 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SipHash13 {
    seed: u32,
}

impl SipHash13 {
    /// Creates a hasher keyed with the given seed.
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }
}

impl Hash32 for SipHash13 {
    fn hash32(&self, bytes: &[u8]) -> u32 {
        let mut hasher = SipHasher13::new_with_keys(u64::from(self.seed), 0);
        hasher.write(bytes);
        let digest = hasher.finish();
        (digest ^ (digest >> 32)) as u32
    }

    fn name(&self) -> &'static str {
        "SipHash13"
    }
}
