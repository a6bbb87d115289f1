//! SipHash-1-3 hash family.

use crate::hasher::traits::SlotHasher;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// SipHash-1-3 keyed with `(seed, !seed)`, truncated to the low 32 bits.
///
/// Slower than [`Murmur3Hasher`](crate::hasher::Murmur3Hasher) but resistant to
/// crafted request keys piling onto one slot.
#[derive(Clone, Copy, Debug, Default)]
pub struct SipHasher;

impl SlotHasher for SipHasher {
    fn hash32(&self, seed: u32, bytes: &[u8]) -> u32 {
        let k0 = seed as u64;
        let mut hasher = SipHasher13::new_with_keys(k0, !k0);
        hasher.write(bytes);
        hasher.finish() as u32
    }

    fn name(&self) -> &'static str {
        "SipHasher"
    }
}
