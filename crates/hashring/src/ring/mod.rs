//! Consistent hash ring implementation.
//!
//! The ring keeps every node's virtual nodes sorted by hash and answers
//! lookups with a binary search, wrapping from the top of the hash space back
//! to the first entry.

pub mod builder;
pub mod ring;

pub use builder::RingBuilder;
pub use ring::HashRing;

/// Virtual nodes generated per node when no replica factor is given.
pub const DEFAULT_REPLICA_FACTOR: u32 = 256;
