//! Core hasher trait definition.

/// A hasher converts raw bytes into a 32-bit ring position.
///
/// Hashers are stateless apart from their seed and are thread-safe, allowing
/// concurrent lookups without synchronization overhead.
pub trait Hash32: Send + Sync {
    /// Hashes `bytes` into a position on the 32-bit ring.
    fn hash32(&self, bytes: &[u8]) -> u32;

    /// Returns the name of this hasher.
    fn name(&self) -> &'static str;
}

impl<H: Hash32 + ?Sized> Hash32 for &H {
    fn hash32(&self, bytes: &[u8]) -> u32 {
        (**self).hash32(bytes)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<H: Hash32 + ?Sized> Hash32 for Box<H> {
    fn hash32(&self, bytes: &[u8]) -> u32 {
        (**self).hash32(bytes)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
