//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Each physical node is placed on the ring `replica_factor` times. The
//! position of replica `r` is the 32-bit hash of the node's key bytes
//! followed by `r` in decimal. This provides:
//!
//! 1. **Better Load Distribution**: More positions = smoother distribution of keys
//! 2. **Gradual Rebalancing**: When nodes join/leave, only a fraction of keys move
//!
//! # Performance Characteristics
//!
//! - **Memory**: 16 bytes per virtual node
//! - **Lookup**: O(log n) where n = total virtual nodes
//! - **Add/Remove**: O(v * n) where v = replica factor (sorted vector inserts)
//!
//! More virtual nodes = better distribution but more memory and slower
//! membership changes.

/// A virtual node on the hash ring.
///
/// The owning node is referenced by its stable slot index in the ring's node
/// storage, never by pointer, so removing one node cannot leave another
/// node's entries dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualNode {
    /// Position on the ring.
    pub hash: u32,
    /// Slot of the owning node in the ring's node storage.
    pub(crate) slot: usize,
}

impl VirtualNode {
    #[inline]
    pub(crate) fn new(hash: u32, slot: usize) -> Self {
        Self { hash, slot }
    }

    /// Get the ring position.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Clockwise distance from this virtual node to `other` on the 2^32 ring.
    ///
    /// # Example
    /// A node at `u32::MAX` is one step before a node at `0`.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u64 {
        distance(self.hash, other.hash)
    }
}

/// Clockwise distance from `from` to `to`, where equal positions are a full
/// turn apart.
#[inline]
pub(crate) fn distance(from: u32, to: u32) -> u64 {
    if to > from {
        u64::from(to - from)
    } else {
        (1u64 << 32) - u64::from(from - to)
    }
}

impl std::fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VNode(hash={:08x}, slot={})", self.hash, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vnode_distance() {
        let vnode1 = VirtualNode::new(100, 0);
        let vnode2 = VirtualNode::new(200, 1);

        assert_eq!(vnode1.distance_to(&vnode2), 100);
        assert_eq!(vnode2.distance_to(&vnode1), (1u64 << 32) - 100);
    }

    #[test]
    fn test_vnode_distance_wraps() {
        let last = VirtualNode::new(u32::MAX, 0);
        let first = VirtualNode::new(0, 1);
        assert_eq!(last.distance_to(&first), 1);
        // A lone virtual node owns the whole ring.
        assert_eq!(first.distance_to(&first), 1u64 << 32);
    }
}
