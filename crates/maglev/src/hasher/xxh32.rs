//! XXH32 hash family.

use crate::hasher::traits::SlotHasher;
use xxhash_rust::xxh32::xxh32;

/// XXH32 with a caller-supplied seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh32Hasher;

impl SlotHasher for Xxh32Hasher {
    #[inline]
    fn hash32(&self, seed: u32, bytes: &[u8]) -> u32 {
        xxh32(bytes, seed)
    }

    fn name(&self) -> &'static str {
        "Xxh32Hasher"
    }
}
