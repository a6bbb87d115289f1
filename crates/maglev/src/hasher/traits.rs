//! Core hasher trait definitions.

/// A seeded 32-bit hash function over raw bytes.
///
/// Hashers are stateless and thread-safe, so one instance is shared by the
/// registry (permutation seeding) and every concurrent reader (slot lookup).
pub trait SlotHasher: Send + Sync + 'static {
    /// Hashes `bytes` with the given seed.
    ///
    /// Must be a pure function of `(seed, bytes)`: the same input has to give
    /// the same output in every process, otherwise independent balancers
    /// holding the same cells would route differently.
    fn hash32(&self, seed: u32, bytes: &[u8]) -> u32;

    /// Returns the name of this hash family.
    fn name(&self) -> &'static str;
}
