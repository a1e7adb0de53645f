//! 32-bit hash primitives used to place virtual nodes and keys on the ring.
//!
//! The ring only needs a stable, well-distributed, seedable 32-bit hash over
//! raw bytes. Swapping the hasher changes every key assignment, so a ring
//! populated with one hasher must not be queried with another.

pub mod any;
pub mod murmur3;
pub mod sip;
pub mod traits;
pub mod xxh32;

pub use any::{AnyHasher, HashAlgorithm};
pub use murmur3::Murmur3;
pub use sip::SipHash13;
pub use traits::Hash32;
pub use xxh32::Xxh32;
