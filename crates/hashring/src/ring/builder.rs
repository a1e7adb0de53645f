//! Builder for [`HashRing`].

use crate::error::Result;
use crate::hash::{Hash32, Murmur3};
use crate::node::NodeKey;
use crate::ring::{HashRing, DEFAULT_REPLICA_FACTOR};

/// Builds a ring with a chosen hasher, replica factor and initial nodes.
///
/// # Example
///
/// ```rust
/// use hashring::{RingBuilder, Xxh32};
///
/// let ring = RingBuilder::new()
///     .with_vnodes(64)
///     .hasher(Xxh32::with_seed(1))
///     .add_node("node1")
///     .add_node("node2")
///     .build()
///     .unwrap();
///
/// assert_eq!(ring.virtual_node_count(), 128);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder<N, H = Murmur3> {
    hasher: H,
    replica_factor: u32,
    nodes: Vec<N>,
}

impl<N: NodeKey> RingBuilder<N, Murmur3> {
    /// Starts a builder with Murmur3 and [`DEFAULT_REPLICA_FACTOR`].
    pub fn new() -> Self {
        Self {
            hasher: Murmur3::default(),
            replica_factor: DEFAULT_REPLICA_FACTOR,
            nodes: Vec::new(),
        }
    }
}

impl<N: NodeKey> Default for RingBuilder<N, Murmur3> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeKey, H: Hash32> RingBuilder<N, H> {
    /// Sets the number of virtual nodes per node.
    pub fn with_vnodes(mut self, replica_factor: u32) -> Self {
        self.replica_factor = replica_factor;
        self
    }

    /// Replaces the hasher.
    pub fn hasher<H2: Hash32>(self, hasher: H2) -> RingBuilder<N, H2> {
        RingBuilder {
            hasher,
            replica_factor: self.replica_factor,
            nodes: self.nodes,
        }
    }

    pub fn add_node(mut self, node: N) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn add_nodes<I: IntoIterator<Item = N>>(mut self, nodes: I) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Builds the ring. Duplicate nodes are added once.
    pub fn build(self) -> Result<HashRing<N, H>> {
        let mut ring = HashRing::with_hasher(self.hasher, self.replica_factor)?;
        ring.extend(self.nodes);
        Ok(ring)
    }
}
