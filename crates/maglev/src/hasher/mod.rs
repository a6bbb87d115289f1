//! Seeded 32-bit hash families.
//!
//! Three independently seeded hashes drive the balancer: one for each cell's
//! permutation offset, one for its skip, and one for incoming request keys.
//! Instances agree on routing only when they share the hash family and all
//! three seeds.

pub mod murmur3;
pub mod sip;
pub mod traits;
pub mod xxh32;

use serde::{Deserialize, Serialize};

pub use self::murmur3::Murmur3Hasher;
pub use sip::SipHasher;
pub use traits::SlotHasher;
pub use xxh32::Xxh32Hasher;

/// Seeds for the three hash roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HashSeeds {
    /// Seed for hashing request keys to a slot.
    pub input: u32,
    /// Seed for a cell's permutation offset.
    pub offset: u32,
    /// Seed for a cell's permutation skip.
    pub skip: u32,
}

impl Default for HashSeeds {
    fn default() -> Self {
        Self {
            input: 0xaceaceac,
            offset: 0xdeadbabe,
            skip: 0xdeadbeaf,
        }
    }
}
