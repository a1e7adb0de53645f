//! Thread-shared ring.
//!
//! [`HashRing`] is single-threaded by contract. `SharedRing` serializes access
//! with a `parking_lot::RwLock`: lookups run concurrently on the read side,
//! membership changes take the write side. Lookups return owned node copies
//! because a reference into the ring cannot outlive the read guard.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::hash::{Hash32, Murmur3};
use crate::node::NodeKey;
use crate::ring::HashRing;

/// A [`HashRing`] behind a read-write lock.
pub struct SharedRing<N, H = Murmur3> {
    inner: RwLock<HashRing<N, H>>,
}

impl<N: NodeKey, H: Hash32> SharedRing<N, H> {
    pub fn new(ring: HashRing<N, H>) -> Self {
        Self {
            inner: RwLock::new(ring),
        }
    }

    pub fn add_node(&self, node: N) -> bool {
        self.inner.write().add_node(node)
    }

    pub fn remove_node(&self, node: &N) -> bool {
        self.inner.write().remove_node(node)
    }

    /// Owner of `key`, cloned out of the ring.
    pub fn get_node<K: AsRef<[u8]>>(&self, key: K) -> Result<N> {
        self.inner.read().get_node(key).cloned()
    }

    pub fn get_nodes<K: AsRef<[u8]>>(&self, key: K, count: usize) -> Result<Vec<N>> {
        let ring = self.inner.read();
        let nodes = ring.get_nodes(key, count)?;
        Ok(nodes.into_iter().cloned().collect())
    }

    pub fn get_node_list(&self) -> Vec<N> {
        self.inner.read().nodes().cloned().collect()
    }

    pub fn is_node_active(&self, node: &N) -> bool {
        self.inner.read().is_node_active(node)
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    /// Shared access for several lookups under one lock acquisition.
    pub fn read(&self) -> RwLockReadGuard<'_, HashRing<N, H>> {
        self.inner.read()
    }

    /// Exclusive access for batched membership changes.
    pub fn write(&self) -> RwLockWriteGuard<'_, HashRing<N, H>> {
        self.inner.write()
    }

    pub fn into_inner(self) -> HashRing<N, H> {
        self.inner.into_inner()
    }
}

impl<N: NodeKey> Default for SharedRing<N, Murmur3> {
    fn default() -> Self {
        Self::new(HashRing::new())
    }
}

impl<N: NodeKey, H: Hash32> From<HashRing<N, H>> for SharedRing<N, H> {
    fn from(ring: HashRing<N, H>) -> Self {
        Self::new(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_lookups_during_membership_changes() {
        let ring: HashRing<String> = HashRing::with_replica_factor(32).unwrap();
        let shared = Arc::new(SharedRing::new(ring));
        shared.add_node("base".to_string());

        let readers: Vec<_> = (0..4)
            .map(|t| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for i in 0..2_000 {
                        let owner = shared.get_node(format!("key-{}-{}", t, i)).unwrap();
                        assert!(!owner.is_empty());
                    }
                })
            })
            .collect();

        for i in 0..50 {
            let name = format!("node-{}", i);
            shared.add_node(name.clone());
            if i % 2 == 0 {
                shared.remove_node(&name);
            }
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(shared.node_count(), 26);
        assert_eq!(shared.read().virtual_node_count(), 26 * 32);
    }
}
