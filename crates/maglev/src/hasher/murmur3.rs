//! MurmurHash3 x86_32 hash family (default).

use std::io::Cursor;

use ::murmur3::murmur3_32;

use crate::hasher::traits::SlotHasher;

/// MurmurHash3 x86_32 over the raw key bytes.
///
/// The default seeds in [`HashSeeds`](crate::hasher::HashSeeds) were chosen
/// for this family; balancers sharing cells and seeds with other Maglev
/// deployments using murmur3 build the same tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur3Hasher;

impl SlotHasher for Murmur3Hasher {
    #[inline]
    fn hash32(&self, seed: u32, bytes: &[u8]) -> u32 {
        match murmur3_32(&mut Cursor::new(bytes), seed) {
            Ok(hash) => hash,
            // Reading from an in-memory slice cannot fail.
            Err(_) => unreachable!("murmur3 over a byte slice"),
        }
    }

    fn name(&self) -> &'static str {
        "Murmur3Hasher"
    }
}
