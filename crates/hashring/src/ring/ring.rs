//! Hash ring data structure.
//!
//! # Layout
//!
//! ```text
//! slots:   [Some("a"), None, Some("c")]        owned node copies, stable index
//! members: {"a" -> 0, "c" -> 2}                sorted node set
//! vnodes:  [(0x0312.., 2), (0x1a77.., 0), ...] sorted by (hash, node)
//! ```
//!
//! Virtual nodes refer to their owner by slot index. A removed node's slot is
//! cleared and recycled; no other node's entries are touched.
//!
//! # Concurrency
//!
//! `HashRing` performs no internal synchronization. Mutation needs `&mut self`,
//! so sharing a ring between threads requires the caller to serialize access,
//! typically with a read-write lock where lookups share the read side and
//! `add_node`/`remove_node` take the write side. [`SharedRing`] packages
//! exactly that.
//!
//! [`SharedRing`]: crate::SharedRing

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::hash::{AnyHasher, Hash32, Murmur3};
use crate::node::{virtual_node_name, NodeKey};
use crate::ring::DEFAULT_REPLICA_FACTOR;
use crate::vnode::{distance, VirtualNode};

/// Consistent hash ring mapping keys onto a dynamic set of nodes.
///
/// # Example
///
/// ```rust
/// use hashring::HashRing;
///
/// let mut ring = HashRing::new();
/// ring.add_node("cache-a".to_string());
/// ring.add_node("cache-b".to_string());
///
/// let owner = ring.get_node("user:1234").unwrap();
/// assert!(ring.is_node_active(owner));
/// ```
#[derive(Clone)]
pub struct HashRing<N, H = Murmur3> {
    hasher: H,
    replica_factor: u32,
    slots: Vec<Option<N>>,
    free_slots: Vec<usize>,
    members: BTreeMap<N, usize>,
    vnodes: Vec<VirtualNode>,
}

impl<N: NodeKey> HashRing<N, Murmur3> {
    /// Creates an empty ring using Murmur3 (seed 0) and
    /// [`DEFAULT_REPLICA_FACTOR`] virtual nodes per node.
    pub fn new() -> Self {
        Self::from_parts(Murmur3::default(), DEFAULT_REPLICA_FACTOR)
    }

    /// Creates an empty Murmur3 ring with a custom replica factor.
    pub fn with_replica_factor(replica_factor: u32) -> Result<Self> {
        Self::with_hasher(Murmur3::default(), replica_factor)
    }
}

impl<N: NodeKey> Default for HashRing<N, Murmur3> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeKey> HashRing<N, AnyHasher> {
    /// Creates an empty ring from configuration.
    pub fn from_config(config: &RingConfig) -> Result<Self> {
        config.validate()?;
        Self::with_hasher(config.hasher.build(), config.replica_factor)
    }
}

impl<N: NodeKey, H: Hash32> HashRing<N, H> {
    /// Creates an empty ring with an injected hasher.
    ///
    /// # Errors
    /// [`Error::InvalidReplicaFactor`] if `replica_factor` is zero.
    pub fn with_hasher(hasher: H, replica_factor: u32) -> Result<Self> {
        if replica_factor == 0 {
            return Err(Error::InvalidReplicaFactor(replica_factor));
        }
        debug!(
            hasher = hasher.name(),
            replica_factor, "created consistent hash ring"
        );
        Ok(Self::from_parts(hasher, replica_factor))
    }

    fn from_parts(hasher: H, replica_factor: u32) -> Self {
        Self {
            hasher,
            replica_factor,
            slots: Vec::new(),
            free_slots: Vec::new(),
            members: BTreeMap::new(),
            vnodes: Vec::new(),
        }
    }

    /// Adds `node` to the ring, placing `replica_factor` virtual nodes.
    ///
    /// Returns `false` and leaves the ring untouched if the node is already
    /// active.
    ///
    /// # Performance
    /// - **Time**: O(v * (log n + n)) where v = replica factor, n = virtual nodes
    pub fn add_node(&mut self, node: N) -> bool {
        if self.members.contains_key(&node) {
            trace!(node = %display_key(&node), "node already active");
            return false;
        }

        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node.clone());
                slot
            }
            None => {
                self.slots.push(Some(node.clone()));
                self.slots.len() - 1
            }
        };

        self.vnodes.reserve(self.replica_factor as usize);
        let mut name = Vec::new();
        for replica in 0..self.replica_factor {
            virtual_node_name(&node, replica, &mut name);
            let hash = self.hasher.hash32(&name);
            let idx = match self.search(hash, &node) {
                Ok(idx) | Err(idx) => idx,
            };
            self.vnodes.insert(idx, VirtualNode::new(hash, slot));
        }

        debug!(
            node = %display_key(&node),
            nodes = self.members.len() + 1,
            vnodes = self.vnodes.len(),
            "added node"
        );
        self.members.insert(node, slot);
        true
    }

    /// Removes `node` and exactly its own virtual nodes.
    ///
    /// Returns `false` if the node was not active. Entries of other nodes that
    /// collide on a hash value are never removed: each entry is matched on
    /// both hash and node identity.
    pub fn remove_node(&mut self, node: &N) -> bool {
        let slot = match self.members.get(node) {
            Some(slot) => *slot,
            None => {
                trace!(node = %display_key(node), "node not active");
                return false;
            }
        };

        let mut name = Vec::new();
        for replica in 0..self.replica_factor {
            virtual_node_name(node, replica, &mut name);
            let hash = self.hasher.hash32(&name);
            match self.search(hash, node) {
                Ok(idx) => {
                    self.vnodes.remove(idx);
                }
                Err(_) => warn!(
                    node = %display_key(node),
                    replica,
                    hash,
                    "virtual node missing on removal"
                ),
            }
        }

        self.members.remove(node);
        self.slots[slot] = None;
        self.free_slots.push(slot);

        debug!(
            node = %display_key(node),
            nodes = self.members.len(),
            vnodes = self.vnodes.len(),
            "removed node"
        );
        true
    }

    /// Returns the node owning `key`: the first virtual node clockwise from
    /// the key's hash, wrapping to the start of the ring.
    ///
    /// The returned reference borrows the ring, so it cannot outlive the next
    /// `add_node`/`remove_node`.
    ///
    /// # Errors
    /// [`Error::EmptyRing`] if no node is active.
    pub fn get_node<K: AsRef<[u8]>>(&self, key: K) -> Result<&N> {
        let idx = self.position(key.as_ref())?;
        Ok(self.node_at(self.vnodes[idx].slot))
    }

    /// Returns up to `count` distinct nodes for `key`, walking clockwise from
    /// its owner. The first element is always `get_node(key)`.
    ///
    /// Useful for replica placement: fewer than `count` nodes are returned
    /// only when fewer are active.
    pub fn get_nodes<K: AsRef<[u8]>>(&self, key: K, count: usize) -> Result<Vec<&N>> {
        let start = self.position(key.as_ref())?;
        let wanted = count.min(self.members.len());
        let mut seen = vec![false; self.slots.len()];
        let mut nodes = Vec::with_capacity(wanted);

        for offset in 0..self.vnodes.len() {
            if nodes.len() >= wanted {
                break;
            }
            let slot = self.vnodes[(start + offset) % self.vnodes.len()].slot;
            if !seen[slot] {
                seen[slot] = true;
                nodes.push(self.node_at(slot));
            }
        }
        Ok(nodes)
    }

    /// Returns the active nodes in ascending order.
    pub fn get_node_list(&self) -> Vec<&N> {
        self.members.keys().collect()
    }

    /// Iterates the active nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.members.keys()
    }

    /// Returns true if `node` is active.
    pub fn is_node_active(&self, node: &N) -> bool {
        self.members.contains_key(node)
    }

    /// Iterates `(hash, node)` for every virtual node in ring order.
    pub fn virtual_nodes(&self) -> impl Iterator<Item = (u32, &N)> + '_ {
        self.vnodes
            .iter()
            .map(move |vnode| (vnode.hash, self.node_at(vnode.slot)))
    }

    /// Fraction of the 32-bit hash space owned by each node, in node order.
    ///
    /// A virtual node owns the keys hashing into `(previous, own]`. With a
    /// well-distributed hasher and enough replicas each of `n` nodes owns
    /// roughly `1/n`.
    pub fn ownership(&self) -> Vec<(&N, f64)> {
        let mut owned = vec![0u64; self.slots.len()];
        let len = self.vnodes.len();
        for (i, vnode) in self.vnodes.iter().enumerate() {
            let prev = &self.vnodes[(i + len - 1) % len];
            // Later duplicates of a hash are never reached by a lookup.
            if i > 0 && prev.hash == vnode.hash {
                continue;
            }
            owned[vnode.slot] += distance(prev.hash, vnode.hash);
        }

        let space = (1u64 << 32) as f64;
        self.members
            .iter()
            .map(|(node, slot)| (node, owned[*slot] as f64 / space))
            .collect()
    }

    /// Number of active nodes.
    pub fn node_count(&self) -> usize {
        self.members.len()
    }

    /// Number of virtual nodes on the ring.
    pub fn virtual_node_count(&self) -> usize {
        self.vnodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn replica_factor(&self) -> u32 {
        self.replica_factor
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_slots.clear();
        self.members.clear();
        self.vnodes.clear();
    }

    /// Index of the first virtual node with hash `>=` the key's hash,
    /// wrapping to 0.
    fn position(&self, key: &[u8]) -> Result<usize> {
        if self.vnodes.is_empty() {
            return Err(Error::EmptyRing);
        }
        let hash = self.hasher.hash32(key);
        let idx = self.vnodes.partition_point(|vnode| vnode.hash < hash);
        Ok(if idx == self.vnodes.len() { 0 } else { idx })
    }

    /// Binary search for `(hash, node)` under the ring order: hash first, then
    /// node identity. Colliding hashes therefore sort the same way no matter
    /// which node was added first.
    fn search(&self, hash: u32, node: &N) -> std::result::Result<usize, usize> {
        self.vnodes
            .binary_search_by(|vnode| self.compare(vnode, hash, node))
    }

    fn compare(&self, vnode: &VirtualNode, hash: u32, node: &N) -> Ordering {
        vnode
            .hash
            .cmp(&hash)
            .then_with(|| self.node_at(vnode.slot).cmp(node))
    }

    fn node_at(&self, slot: usize) -> &N {
        match &self.slots[slot] {
            Some(node) => node,
            // Virtual nodes are removed before their slot is cleared.
            None => unreachable!("virtual node refers to vacant slot {}", slot),
        }
    }
}

impl<N: NodeKey, H: Hash32> Extend<N> for HashRing<N, H> {
    fn extend<I: IntoIterator<Item = N>>(&mut self, iter: I) {
        for node in iter {
            self.add_node(node);
        }
    }
}

impl<N: NodeKey> FromIterator<N> for HashRing<N, Murmur3> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let mut ring = Self::new();
        ring.extend(iter);
        ring
    }
}

impl<N, H: Hash32> fmt::Debug for HashRing<N, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("hasher", &self.hasher.name())
            .field("replica_factor", &self.replica_factor)
            .field("nodes", &self.members.len())
            .field("vnodes", &self.vnodes.len())
            .finish()
    }
}

fn display_key<N: NodeKey>(node: &N) -> String {
    let mut buf = Vec::new();
    node.write_key(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
