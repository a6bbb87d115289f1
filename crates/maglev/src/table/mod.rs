//! Lookup tables.
//!
//! A [`LookupTable`] is an immutable snapshot: the sorted cell list together
//! with the slot owners computed from it. The balancer publishes a whole new
//! snapshot on every change, so a reader always pairs slots with the cell
//! list they were built from.

pub mod builder;

pub use builder::fill;

use std::fmt;
use std::sync::Arc;

use crate::cell::Cell;

/// Immutable slot → cell assignment.
#[derive(Debug)]
pub struct LookupTable<C> {
    cells: Vec<Arc<C>>,
    /// Owner index into `cells` for every slot. Empty iff `cells` is empty.
    slots: Box<[u16]>,
    table_size: usize,
}

impl<C: Cell> LookupTable<C> {
    pub(crate) fn new(cells: Vec<Arc<C>>, slots: Vec<u16>, table_size: usize) -> Self {
        debug_assert!(cells.is_empty() || slots.len() == table_size);
        Self {
            cells,
            slots: slots.into_boxed_slice(),
            table_size,
        }
    }

    /// Cells in sorted order. Slot owners index into this list.
    pub fn cells(&self) -> &[Arc<C>] {
        &self.cells
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of slots (M).
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// Owner indices, one per slot. Empty when there are no cells.
    pub fn slots(&self) -> &[u16] {
        &self.slots
    }

    /// Cell owning `slot`, if any.
    pub fn owner(&self, slot: usize) -> Option<&Arc<C>> {
        let index = *self.slots.get(slot)?;
        self.cells.get(index as usize)
    }

    /// Slots owned by each cell, in cell order.
    pub fn slot_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.cells.len()];
        for &owner in self.slots.iter() {
            counts[owner as usize] += 1;
        }
        counts
    }

    /// Compares slot owners (by cell key) against an earlier table.
    pub fn disruption(&self, previous: &LookupTable<C>) -> Disruption {
        let table_size = self.table_size.max(previous.table_size);
        let changed = (0..table_size)
            .filter(|&slot| match (previous.owner(slot), self.owner(slot)) {
                (Some(before), Some(after)) => {
                    !Arc::ptr_eq(before, after) && before.unique_key() != after.unique_key()
                }
                (None, None) => false,
                _ => true,
            })
            .count();

        Disruption {
            changed,
            table_size,
            previous_cells: previous.len(),
            current_cells: self.len(),
        }
    }
}

/// How many slots changed owner between two tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Disruption {
    /// Slots whose owner differs.
    pub changed: usize,
    pub table_size: usize,
    pub previous_cells: usize,
    pub current_cells: usize,
}

impl Disruption {
    /// Fraction of slots that changed owner.
    pub fn changed_ratio(&self) -> f64 {
        if self.table_size == 0 {
            return 0.0;
        }
        self.changed as f64 / self.table_size as f64
    }

    /// Smallest possible fraction for this change in cell count:
    /// `|delta| / max(N_before, N_after)`.
    pub fn ideal_ratio(&self) -> f64 {
        let larger = self.previous_cells.max(self.current_cells);
        if larger == 0 {
            return 0.0;
        }
        self.previous_cells.abs_diff(self.current_cells) as f64 / larger as f64
    }

    /// Disruption beyond the ideal.
    pub fn excess(&self) -> f64 {
        self.changed_ratio() - self.ideal_ratio()
    }
}

impl fmt::Display for Disruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} slots changed ({:.2}%, ideal {:.2}%, excess {:.2}%)",
            self.changed,
            self.table_size,
            self.changed_ratio() * 100.0,
            self.ideal_ratio() * 100.0,
            self.excess() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(keys: &[&'static str], slots: Vec<u16>) -> LookupTable<&'static str> {
        let size = slots.len();
        LookupTable::new(keys.iter().map(|k| Arc::new(*k)).collect(), slots, size)
    }

    #[test]
    fn test_owner_and_counts() {
        let t = table(&["A", "B", "C"], vec![2, 0, 0, 1, 2, 1, 0]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.table_size(), 7);
        assert_eq!(**t.owner(0).unwrap(), "C");
        assert_eq!(**t.owner(3).unwrap(), "B");
        assert!(t.owner(7).is_none());
        assert_eq!(t.slot_counts(), vec![3, 2, 2]);
    }

    #[test]
    fn test_empty() {
        let t: LookupTable<&'static str> = LookupTable::new(Vec::new(), Vec::new(), 7);
        assert!(t.is_empty());
        assert!(t.owner(0).is_none());
        assert!(t.slot_counts().is_empty());
    }

    #[test]
    fn test_disruption() {
        let before = table(&["A", "B", "C"], vec![2, 0, 0, 1, 2, 1, 0]);
        // Indices shift after B leaves; comparison is by key.
        let after = table(&["A", "C"], vec![1, 0, 0, 1, 1, 0, 0]);
        let d = after.disruption(&before);
        assert_eq!(d.changed, 2);
        assert_eq!(d.table_size, 7);
        assert!((d.ideal_ratio() - 1.0 / 3.0).abs() < 1e-9);
        assert!((d.changed_ratio() - 2.0 / 7.0).abs() < 1e-9);
        assert!(d.to_string().starts_with("2 of 7 slots changed"));
    }
}
