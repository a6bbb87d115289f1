//! Sorted cell registry.
//!
//! Holds the active cells in comparator order with one [`PermutationState`]
//! per cell, at the same index. A state travels with its cell through
//! inserts and removals of other cells, so its cached permutation is never
//! recomputed while the cell stays registered.
//!
//! The registry is not synchronized; the balancer owns it behind a mutex.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::cell::Cell;
use crate::error::Result;
use crate::hasher::{HashSeeds, SlotHasher};
use crate::permutation::PermutationState;
use crate::table::{fill, LookupTable};

/// Shared total order over cells.
pub type Comparator<C> = Arc<dyn Fn(&C, &C) -> Ordering + Send + Sync>;

/// Room reserved beyond the initial cell count for later additions.
const SPARE: usize = 20;

pub struct Registry<C, H> {
    cells: Vec<Arc<C>>,
    states: Vec<PermutationState>,
    table_size: u32,
    hasher: Arc<H>,
    seeds: HashSeeds,
    comparator: Comparator<C>,
}

impl<C: Cell, H: SlotHasher> Registry<C, H> {
    /// Sorts `cells` and derives a permutation state for each.
    ///
    /// Cells comparing equal are kept once (the first in sorted order).
    pub fn new(
        cells: Vec<Arc<C>>,
        table_size: u32,
        hasher: Arc<H>,
        seeds: HashSeeds,
        comparator: Comparator<C>,
    ) -> Self {
        let mut sorted = Vec::with_capacity(cells.len() + SPARE);
        sorted.extend(cells);
        sorted.sort_by(|a, b| comparator(&**a, &**b));
        sorted.dedup_by(|a, b| comparator(&**a, &**b) == Ordering::Equal);

        let mut states = Vec::with_capacity(sorted.capacity());
        states.extend(
            sorted
                .iter()
                .map(|cell| PermutationState::new(cell.unique_key(), table_size, &*hasher, &seeds)),
        );

        Self {
            cells: sorted,
            states,
            table_size,
            hasher,
            seeds,
            comparator,
        }
    }

    fn search(&self, cell: &C) -> std::result::Result<usize, usize> {
        self.cells
            .binary_search_by(|probe| (self.comparator)(&**probe, cell))
    }

    /// Inserts `cell` at its sorted position.
    ///
    /// Returns `false` if an equal cell is already registered. A new cell gets
    /// its first `M / N` permutation values cached up front.
    pub fn insert(&mut self, cell: Arc<C>) -> bool {
        let pos = match self.search(&cell) {
            Ok(_) => return false,
            Err(pos) => pos,
        };

        let mut state =
            PermutationState::new(cell.unique_key(), self.table_size, &*self.hasher, &self.seeds);
        self.cells.insert(pos, cell);
        state.warm(self.table_size as usize / self.cells.len());
        self.states.insert(pos, state);
        true
    }

    /// Removes the cell equal to `cell` and hands back the registered one.
    pub fn remove(&mut self, cell: &C) -> Option<Arc<C>> {
        let pos = self.search(cell).ok()?;
        self.states.remove(pos);
        Some(self.cells.remove(pos))
    }

    pub fn contains(&self, cell: &C) -> bool {
        self.search(cell).is_ok()
    }

    /// Restarts every cell's claim cursor, keeping cached permutations.
    pub fn reset_all(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }

    /// Runs the round-robin fill over the current cells.
    ///
    /// Cursors are left where the fill stopped; call [`reset_all`] first when
    /// rebuilding.
    ///
    /// [`reset_all`]: Registry::reset_all
    pub fn build_table(&mut self) -> Result<LookupTable<C>> {
        let slots = fill(&mut self.states, self.table_size)?;
        Ok(LookupTable::new(
            self.cells.clone(),
            slots,
            self.table_size as usize,
        ))
    }

    pub fn cells(&self) -> &[Arc<C>] {
        &self.cells
    }

    pub fn states(&self) -> &[PermutationState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn table_size(&self) -> u32 {
        self.table_size
    }

    /// Permutation positions consumed by the last fill, summed over cells.
    pub fn steps_used(&self) -> usize {
        self.states.iter().map(PermutationState::next_pos).sum()
    }
}
