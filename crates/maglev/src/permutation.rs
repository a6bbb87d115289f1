//! Per-cell slot permutations.
//!
//! Every cell visits the table slots in its own order:
//!
//! ```text
//! p(0) = offset
//! p(j) = (p(j - 1) + skip) mod M
//! ```
//!
//! where `offset = H_offset(key) mod M` and `skip = H_skip(key) mod (M - 1) + 1`.
//! With a prime `M` every `skip` is coprime to `M`, so the first `M` values
//! are a permutation of `0..M`.
//!
//! Values are computed lazily and cached in `row`. The sequence is a pure
//! function of the key, `M` and the seeds, so the cache stays valid across
//! rebuilds no matter which other cells come and go; only the claim cursor
//! (`next_pos`) is reset.

use crate::hasher::{HashSeeds, SlotHasher};

/// Permutation cursor and value cache for one cell.
#[derive(Clone, Debug)]
pub struct PermutationState {
    offset: u16,
    skip: u16,
    table_size: u32,
    /// Number of permutation values already handed out in the current build.
    next_pos: usize,
    /// `row[j] == p(j)`. Never empty: `row[0]` is the offset.
    row: Vec<u16>,
}

impl PermutationState {
    /// Derives offset and skip for `key`.
    ///
    /// `table_size` must be in `2..=65521`; the config validates this before
    /// any state is created.
    pub fn new<H: SlotHasher + ?Sized>(
        key: &str,
        table_size: u32,
        hasher: &H,
        seeds: &HashSeeds,
    ) -> Self {
        let offset = hasher.hash32(seeds.offset, key.as_bytes()) % table_size;
        let skip = hasher.hash32(seeds.skip, key.as_bytes()) % (table_size - 1) + 1;
        Self::from_parts(offset as u16, skip as u16, table_size)
    }

    pub(crate) fn from_parts(offset: u16, skip: u16, table_size: u32) -> Self {
        debug_assert!(table_size >= 2 && (offset as u32) < table_size);
        debug_assert!(skip >= 1 && (skip as u32) < table_size);
        Self {
            offset,
            skip,
            table_size,
            next_pos: 0,
            row: vec![offset],
        }
    }

    /// Returns `p(j)`, computing and caching any missing values up to `j`.
    pub fn permutation(&mut self, j: usize) -> u16 {
        while self.row.len() <= j {
            let last = self.row[self.row.len() - 1] as u32;
            self.row.push(((last + self.skip as u32) % self.table_size) as u16);
        }
        self.row[j]
    }

    /// Returns the next slot this cell should try and advances the cursor.
    ///
    /// `None` once all `M` positions have been handed out in this build.
    pub fn next_candidate(&mut self) -> Option<usize> {
        if self.next_pos >= self.table_size as usize {
            return None;
        }
        let slot = self.permutation(self.next_pos);
        self.next_pos += 1;
        Some(slot as usize)
    }

    /// Eagerly caches the first `columns` values (capped at `M`).
    pub fn warm(&mut self, columns: usize) {
        let columns = columns.min(self.table_size as usize);
        if columns > 0 {
            self.permutation(columns - 1);
        }
    }

    /// Restarts the claim cursor. Cached values are kept.
    pub fn reset(&mut self) {
        self.next_pos = 0;
    }

    #[inline]
    pub fn offset(&self) -> u16 {
        self.offset
    }

    #[inline]
    pub fn skip(&self) -> u16 {
        self.skip
    }

    #[inline]
    pub fn next_pos(&self) -> usize {
        self.next_pos
    }

    /// Number of permutation values currently cached.
    #[inline]
    pub fn cached_len(&self) -> usize {
        self.row.len()
    }
}
