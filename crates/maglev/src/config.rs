//! Balancer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hasher::HashSeeds;

/// Largest table size and largest cell count.
///
/// Slot owners and permutation values are stored as `u16`, and 65521 is the
/// largest prime below `u16::MAX`.
pub const MAX_TABLE_SIZE: u32 = 65521;

/// Table size used when none is configured.
pub const DEFAULT_TABLE_SIZE: u32 = MAX_TABLE_SIZE;

/// Construction parameters shared by every instance that must route alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Number of lookup-table slots (M). Must be prime.
    pub table_size: u32,
    /// Hash seeds for input, offset and skip.
    pub seeds: HashSeeds,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            seeds: HashSeeds::default(),
        }
    }
}

impl BalancerConfig {
    /// Config with the given table size and default seeds.
    pub fn with_table_size(table_size: u32) -> Self {
        Self {
            table_size,
            ..Self::default()
        }
    }

    /// Checks the config against an initial cell count.
    pub fn validate(&self, cell_count: usize) -> Result<()> {
        if cell_count == 0 {
            return Err(Error::invalid("Empty cells"));
        }
        if cell_count > MAX_TABLE_SIZE as usize || self.table_size > MAX_TABLE_SIZE {
            return Err(Error::invalid(format!(
                "at most {} cells and {} slots are supported (got {} cells, {} slots)",
                MAX_TABLE_SIZE, MAX_TABLE_SIZE, cell_count, self.table_size
            )));
        }
        if self.table_size < 2 {
            return Err(Error::invalid(format!(
                "table size must be at least 2, got {}",
                self.table_size
            )));
        }
        if !is_prime(self.table_size) {
            return Err(Error::invalid(format!(
                "table size {} is not prime (next prime is {})",
                self.table_size,
                next_prime(self.table_size)
            )));
        }
        if cell_count > self.table_size as usize {
            return Err(Error::invalid(format!(
                "{} cells do not fit in a table of {} slots",
                cell_count, self.table_size
            )));
        }
        Ok(())
    }
}

/// Trial-division primality test.
pub fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let n = n as u64;
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Smallest prime `>= n`.
pub fn next_prime(n: u32) -> u32 {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}
