//! Round-robin table filling.
//!
//! # Algorithm
//!
//! 1. Start with every slot unfilled.
//! 2. Sweep the cells in sorted order. Each cell walks its permutation until
//!    it reaches an unfilled slot, claims it, and yields to the next cell.
//! 3. Repeat sweeps until all `M` slots are claimed.
//!
//! Every full sweep hands out exactly one slot per cell, so each cell ends
//! with at least `floor(M / N)` slots. The result only depends on the cell
//! order and the permutations, which makes it identical on every instance
//! holding the same cells.

use tracing::error;

use crate::error::{Error, Result};
use crate::permutation::PermutationState;

/// Marker for an unclaimed slot in the working buffer. Owners are stored
/// biased by one.
const UNFILLED: u16 = 0;

/// Fills a table of `table_size` slots from `states`, in order.
///
/// Returns the owning state's index for every slot. Each state's cursor is
/// advanced past the positions it consumed; callers reset the cursors before
/// the next build. An empty `states` yields an empty table.
///
/// # Errors
///
/// [`Error::PermutationExhausted`] if a whole sweep claims nothing before the
/// table is full. That cannot happen when `table_size` is prime.
pub fn fill(states: &mut [PermutationState], table_size: u32) -> Result<Vec<u16>> {
    let m = table_size as usize;
    if states.is_empty() || m == 0 {
        return Ok(Vec::new());
    }
    debug_assert!(states.len() <= m && m <= u16::MAX as usize);

    let mut slots = vec![UNFILLED; m];
    let mut filled = 0usize;

    loop {
        let mut claimed = false;

        for (index, state) in states.iter_mut().enumerate() {
            while let Some(slot) = state.next_candidate() {
                if slots[slot] == UNFILLED {
                    slots[slot] = index as u16 + 1;
                    filled += 1;
                    claimed = true;
                    if filled == m {
                        return Ok(slots.into_iter().map(|owner| owner - 1).collect());
                    }
                    break;
                }
            }
        }

        if !claimed {
            error!(filled, table_size = m, "permutations exhausted before the table filled");
            return Err(Error::PermutationExhausted {
                filled,
                table_size: m,
            });
        }
    }
}
