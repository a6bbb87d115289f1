//! Maglev consistent hashing.
//!
//! This crate maps request keys to backend cells through a fixed-size lookup
//! table built with the Maglev permutation scheme:
//! - Per-cell slot permutations derived from seeded hashes of the cell key
//! - Round-robin table filling in cell order
//! - A sorted cell registry with incremental add/remove
//! - A balancer publishing immutable table snapshots to lock-free readers
//!
//! Lookups are O(1). Independent instances given the same cells, order,
//! table size, hash family and seeds build identical tables, and changing a
//! few cells moves only a small share of slots.

pub mod balancer;
pub mod cell;
pub mod config;
pub mod error;
pub mod hasher;
pub mod permutation;
pub mod registry;
pub mod table;

pub use balancer::{Balancer, BalancerBuilder};
pub use cell::{Cell, Endpoint};
pub use config::{is_prime, next_prime, BalancerConfig, DEFAULT_TABLE_SIZE, MAX_TABLE_SIZE};
pub use error::{Error, Result};
pub use hasher::{HashSeeds, Murmur3Hasher, SipHasher, SlotHasher, Xxh32Hasher};
pub use permutation::PermutationState;
pub use table::{Disruption, LookupTable};
