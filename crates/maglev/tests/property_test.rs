//! Property tests over random cell sets.

use std::collections::BTreeSet;

use maglev::{Balancer, BalancerConfig};
use proptest::prelude::*;

const PRIMES: [u32; 5] = [7, 13, 101, 251, 1009];

/// A non-empty set of unique cell keys that fits in the table.
fn cells_and_size() -> impl Strategy<Value = (Vec<String>, u32)> {
    prop::sample::select(PRIMES.to_vec()).prop_flat_map(|m| {
        let max = (m as usize).min(40);
        (
            prop::collection::btree_set("[a-z0-9]{1,12}", 1..=max)
                .prop_map(|set| set.into_iter().collect::<Vec<_>>()),
            Just(m),
        )
    })
}

fn build(cells: Vec<String>, m: u32) -> Balancer<String> {
    Balancer::with_config(cells, BalancerConfig::with_table_size(m)).unwrap()
}

proptest! {
    #[test]
    fn prop_every_slot_filled_fairly((cells, m) in cells_and_size()) {
        let n = cells.len();
        let balancer = build(cells, m);
        let counts = balancer.snapshot().slot_counts();
        prop_assert_eq!(counts.len(), n);
        prop_assert_eq!(counts.iter().sum::<usize>(), m as usize);
        for count in counts {
            prop_assert!(count >= m as usize / n);
        }
    }

    #[test]
    fn prop_deterministic((cells, m) in cells_and_size(), keys in prop::collection::vec(".*", 1..20)) {
        let mut reversed = cells.clone();
        reversed.reverse();
        let a = build(cells, m);
        let b = build(reversed, m);
        let (sa, sb) = (a.snapshot(), b.snapshot());
        prop_assert_eq!(sa.slots(), sb.slots());
        for key in &keys {
            prop_assert_eq!(a.lookup(key), b.lookup(key));
        }
    }

    #[test]
    fn prop_incremental_equals_fresh(
        (cells, m) in cells_and_size(),
        extra in prop::collection::btree_set("[A-Z]{1,6}", 1..5),
        drop_every in 2usize..5,
    ) {
        // Extra keys are upper-case, so they never collide with `cells`.
        let balancer = build(cells.clone(), m);
        let extra: Vec<String> = extra
            .into_iter()
            .take((m as usize).saturating_sub(cells.len()))
            .collect();
        balancer.add_cells(extra.clone()).unwrap();

        let dropped: Vec<String> = cells.iter().step_by(drop_every).cloned().collect();
        let kept: BTreeSet<String> = cells
            .iter()
            .chain(&extra)
            .filter(|c| !dropped.contains(c))
            .cloned()
            .collect();
        balancer.remove_cells(&dropped).unwrap();

        if kept.is_empty() {
            prop_assert!(balancer.is_empty());
            prop_assert!(balancer.lookup("k").is_none());
        } else {
            let fresh = build(kept.into_iter().collect(), m);
            let (incremental, rebuilt) = (balancer.snapshot(), fresh.snapshot());
            prop_assert_eq!(incremental.slots(), rebuilt.slots());
        }
    }

    #[test]
    fn prop_noop_mutations_keep_snapshot((cells, m) in cells_and_size()) {
        let balancer = build(cells.clone(), m);
        let before = balancer.snapshot();
        prop_assert_eq!(balancer.add_cells(cells.clone()).unwrap(), 0);
        prop_assert_eq!(balancer.remove_cells(["NOT-A-CELL".to_string()]).unwrap(), 0);
        prop_assert!(std::sync::Arc::ptr_eq(&before, &balancer.snapshot()));
    }
}
