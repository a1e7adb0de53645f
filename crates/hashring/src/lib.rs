//! Consistent hash ring with virtual nodes.
//!
//! This crate provides the building blocks for mapping request keys onto a
//! dynamic set of named nodes:
//! - 32-bit hash primitives (the injected hash dependency)
//! - Node identity projection for virtual-node naming
//! - The sorted ring of virtual nodes and its lookup operations
//! - A lock-wrapped ring for callers that share it between threads
//! - Jump consistent hashing for fixed, numbered bucket sets

pub mod config;
pub mod error;
pub mod hash;
pub mod jump;
pub mod node;
pub mod ring;
pub mod shared;
pub mod vnode;

pub use config::{HasherConfig, RingConfig};
pub use error::{Error, Result};
pub use hash::{AnyHasher, HashAlgorithm, Hash32, Murmur3, SipHash13, Xxh32};
pub use jump::jump_hash;
pub use node::NodeKey;
pub use ring::{HashRing, RingBuilder, DEFAULT_REPLICA_FACTOR};
pub use shared::SharedRing;
pub use vnode::VirtualNode;
