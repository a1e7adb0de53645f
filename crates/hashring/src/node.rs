//! Node identity for the consistent hash ring.
//!
//! Nodes are opaque, application-defined identifiers. The ring stores its own
//! copy of each node and needs two things from it: a total order (for the
//! sorted node set and the tie-break between colliding virtual nodes) and a
//! canonical byte projection used to name its virtual nodes.

use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

/// An identifier that can be placed on the ring.
///
/// `write_key` must be stable: the same node must always produce the same
/// bytes, otherwise `remove_node` cannot regenerate the virtual node hashes
/// that `add_node` produced.
///
/// Types that are not strings implement this as their conversion function:
///
/// ```
/// use hashring::NodeKey;
///
/// #[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
/// struct Shard {
///     host: String,
///     port: u16,
/// }
///
/// impl NodeKey for Shard {
///     fn write_key(&self, buf: &mut Vec<u8>) {
///         buf.extend_from_slice(self.host.as_bytes());
///         buf.push(b':');
///         buf.extend_from_slice(self.port.to_string().as_bytes());
///     }
/// }
/// ```
pub trait NodeKey: Clone + Ord {
    /// Appends the canonical byte representation of this node to `buf`.
    fn write_key(&self, buf: &mut Vec<u8>);
}

impl NodeKey for String {
    fn write_key(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl NodeKey for &'static str {
    fn write_key(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl NodeKey for Box<str> {
    fn write_key(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl NodeKey for Arc<str> {
    fn write_key(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl NodeKey for Rc<str> {
    fn write_key(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl NodeKey for Cow<'static, str> {
    fn write_key(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

macro_rules! impl_node_key_decimal {
    ($($t:ty),*) => {
        $(
            impl NodeKey for $t {
                fn write_key(&self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(self.to_string().as_bytes());
                }
            }
        )*
    };
}

impl_node_key_decimal!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Builds the name of virtual node `replica` of `node`: the node's key bytes
/// followed by the replica index in decimal.
pub(crate) fn virtual_node_name<N: NodeKey>(node: &N, replica: u32, buf: &mut Vec<u8>) {
    buf.clear();
    node.write_key(buf);
    buf.extend_from_slice(replica.to_string().as_bytes());
}
