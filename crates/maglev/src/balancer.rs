//! Maglev balancer.
//!
//! # Concurrency
//!
//! - Readers load the current [`LookupTable`] through an [`ArcSwap`]; a
//!   lookup never takes a lock and never writes shared state.
//! - Writers (`add_cells`/`remove_cells`) serialize on a mutex guarding the
//!   registry, rebuild a complete table, and publish it with a single
//!   pointer swap. Readers see either the old or the new table, never a
//!   partially filled one.
//! - Old tables stay alive for as long as a reader still holds them.
//!
//! # Cost
//!
//! - `lookup`: one hash, one array read.
//! - `add_cells`/`remove_cells`: O(N) array moves plus a full O(M) rebuild.
//!   The claim order depends on the whole cell set, so partial rebuilds would
//!   not give the same table as a fresh construction.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::cell::Cell;
use crate::config::BalancerConfig;
use crate::error::Result;
use crate::hasher::{HashSeeds, Murmur3Hasher, SlotHasher};
use crate::registry::{Comparator, Registry};
use crate::table::{Disruption, LookupTable};

/// State owned by the single active mutator.
struct Writer<C, H> {
    registry: Registry<C, H>,
    last_disruption: Option<Disruption>,
}

/// Consistent-hash balancer mapping request keys to cells.
///
/// # Example
///
/// ```rust
/// use maglev::{Balancer, Endpoint};
///
/// let balancer = Balancer::new(vec![
///     Endpoint::new("10.0.0.1", 80),
///     Endpoint::new("10.0.0.2", 80),
/// ])
/// .unwrap();
///
/// let cell = balancer.lookup("client-42").unwrap();
/// assert_eq!(balancer.lookup("client-42").unwrap(), cell);
/// ```
pub struct Balancer<C, H = Murmur3Hasher> {
    config: BalancerConfig,
    hasher: Arc<H>,
    comparator: Comparator<C>,
    writer: Mutex<Writer<C, H>>,
    current: ArcSwap<LookupTable<C>>,
}

impl<C: Cell + Ord> Balancer<C, Murmur3Hasher> {
    /// Builds a balancer over `cells` with the default table size and seeds.
    pub fn new<I>(cells: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Arc<C>>,
    {
        Self::with_config(cells, BalancerConfig::default())
    }

    /// Builds a balancer over `cells` with an explicit configuration.
    pub fn with_config<I>(cells: I, config: BalancerConfig) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Arc<C>>,
    {
        Self::from_parts(
            cells.into_iter().map(Into::into).collect(),
            config,
            Murmur3Hasher,
            Arc::new(|a: &C, b: &C| a.cmp(b)),
        )
    }
}

impl<C: Cell> Balancer<C, Murmur3Hasher> {
    /// Builds a balancer ordering cells with `comparator`.
    ///
    /// `table_size` defaults to 65521 when `None`.
    pub fn with_comparator<I, F>(cells: I, table_size: Option<u32>, comparator: F) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Arc<C>>,
        F: Fn(&C, &C) -> Ordering + Send + Sync + 'static,
    {
        let config = table_size
            .map(BalancerConfig::with_table_size)
            .unwrap_or_default();
        Self::from_parts(
            cells.into_iter().map(Into::into).collect(),
            config,
            Murmur3Hasher,
            Arc::new(comparator),
        )
    }
}

impl<C: Cell, H: SlotHasher> Balancer<C, H> {
    pub(crate) fn from_parts(
        cells: Vec<Arc<C>>,
        config: BalancerConfig,
        hasher: H,
        comparator: Comparator<C>,
    ) -> Result<Self> {
        config.validate(cells.len())?;

        let start = Instant::now();
        let hasher = Arc::new(hasher);
        debug!(
            cells = cells.len(),
            table_size = config.table_size,
            hasher = hasher.name(),
            "building balancer"
        );

        let mut registry = Registry::new(
            cells,
            config.table_size,
            Arc::clone(&hasher),
            config.seeds,
            Arc::clone(&comparator),
        );
        let table = registry.build_table()?;

        let steps = registry.steps_used();
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            steps,
            occupation_pct = steps as f64 * 100.0
                / config.table_size as f64
                / registry.len() as f64,
            "lookup table built"
        );

        Ok(Self {
            config,
            hasher,
            comparator,
            writer: Mutex::new(Writer {
                registry,
                last_disruption: None,
            }),
            current: ArcSwap::from_pointee(table),
        })
    }

    /// Slot index for `key`: `H_input(key) mod M`.
    #[inline]
    pub fn slot_for(&self, key: impl AsRef<[u8]>) -> usize {
        let hash = self.hasher.hash32(self.config.seeds.input, key.as_ref());
        (hash % self.config.table_size) as usize
    }

    /// Cell responsible for `key`, or `None` when no cells are registered.
    ///
    /// With a single cell the table is not consulted.
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Option<Arc<C>> {
        let table = self.current.load();
        match table.len() {
            0 => None,
            1 => table.cells().first().cloned(),
            _ => table.owner(self.slot_for(key)).cloned(),
        }
    }

    /// Registers new cells and republishes the table.
    ///
    /// Cells already present are skipped, as are cells that would push the
    /// cell count above the table size. Returns the number actually added;
    /// nothing is rebuilt when that is zero.
    ///
    /// If the rebuild fails the added cells are unregistered again, so the
    /// balancer is left exactly as it was before the call.
    pub fn add_cells<I>(&self, cells: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Arc<C>>,
    {
        let cells: Vec<Arc<C>> = cells.into_iter().map(Into::into).collect();
        if cells.is_empty() {
            debug!("add_cells: nothing to add");
            return Ok(0);
        }

        let start = Instant::now();
        let mut writer = self.writer.lock();
        let capacity = self.config.table_size as usize;
        let mut inserted = Vec::new();

        for cell in cells {
            if writer.registry.contains(&cell) {
                trace!(cell = cell.unique_key(), "cell already exists");
                continue;
            }
            if writer.registry.len() >= capacity {
                warn!(
                    cell = cell.unique_key(),
                    table_size = capacity,
                    "table full, cell not added"
                );
                continue;
            }
            writer.registry.insert(Arc::clone(&cell));
            inserted.push(cell);
        }
        let added = inserted.len();

        debug!(
            added,
            elapsed_us = start.elapsed().as_micros() as u64,
            "cells inserted"
        );

        if added > 0 {
            if let Err(err) = self.republish(&mut writer) {
                for cell in &inserted {
                    writer.registry.remove(cell);
                }
                warn!(added, error = %err, "rebuild failed, additions rolled back");
                return Err(err);
            }
        }

        debug!(
            added,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "add_cells completed"
        );
        Ok(added)
    }

    /// Unregisters cells and republishes the table.
    ///
    /// Cells not present are skipped. Returns the number actually removed;
    /// nothing is rebuilt when that is zero. Removing every cell publishes an
    /// empty table, after which lookups return `None`.
    ///
    /// If the rebuild fails the removed cells are registered again.
    pub fn remove_cells<I>(&self, cells: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Borrow<C>,
    {
        let cells: Vec<I::Item> = cells.into_iter().collect();
        if cells.is_empty() {
            debug!("remove_cells: nothing to remove");
            return Ok(0);
        }

        let start = Instant::now();
        let mut writer = self.writer.lock();
        if writer.registry.is_empty() {
            debug!("remove_cells: already empty");
            return Ok(0);
        }

        let mut taken = Vec::new();
        for cell in &cells {
            let cell: &C = cell.borrow();
            match writer.registry.remove(cell) {
                Some(registered) => taken.push(registered),
                None => trace!(cell = cell.unique_key(), "cell not registered"),
            }
        }
        let removed = taken.len();

        debug!(
            removed,
            elapsed_us = start.elapsed().as_micros() as u64,
            "cells removed"
        );

        if removed > 0 {
            if let Err(err) = self.republish(&mut writer) {
                for cell in taken {
                    writer.registry.insert(cell);
                }
                warn!(removed, error = %err, "rebuild failed, removals rolled back");
                return Err(err);
            }
        }

        debug!(
            removed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "remove_cells completed"
        );
        Ok(removed)
    }

    /// Rebuilds from scratch and swaps the new table in.
    ///
    /// On error the previous table stays published.
    fn republish(&self, writer: &mut Writer<C, H>) -> Result<()> {
        writer.registry.reset_all();
        let table = Arc::new(writer.registry.build_table()?);
        let previous = self.current.swap(Arc::clone(&table));

        let disruption = table.disruption(&previous);
        debug!(
            cells = table.len(),
            changed = disruption.changed,
            changed_pct = disruption.changed_ratio() * 100.0,
            ideal_pct = disruption.ideal_ratio() * 100.0,
            excess_pct = disruption.excess() * 100.0,
            "lookup table republished"
        );
        writer.last_disruption = Some(disruption);
        Ok(())
    }

    /// The currently published table.
    pub fn snapshot(&self) -> Arc<LookupTable<C>> {
        self.current.load_full()
    }

    /// Registered cells in sorted order.
    pub fn cells(&self) -> Vec<Arc<C>> {
        self.current.load().cells().to_vec()
    }

    /// Whether a cell equal to `cell` is in the published table.
    ///
    /// Reads the current snapshot like [`cells`](Self::cells) and
    /// [`len`](Self::len), so it never waits on a rebuild in progress.
    pub fn contains(&self, cell: &C) -> bool {
        self.current
            .load()
            .cells()
            .binary_search_by(|probe| (self.comparator)(&**probe, cell))
            .is_ok()
    }

    /// Number of registered cells.
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Number of slots (M).
    pub fn table_size(&self) -> usize {
        self.config.table_size as usize
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Name of the hash family in use.
    pub fn hasher_name(&self) -> &'static str {
        self.hasher.name()
    }

    /// Slot churn caused by the most recent successful add/remove.
    pub fn last_disruption(&self) -> Option<Disruption> {
        self.writer.lock().last_disruption
    }
}

impl<C: Cell> Balancer<C, Murmur3Hasher> {
    /// Starts a builder for `Ord` cells.
    pub fn builder() -> BalancerBuilder<C>
    where
        C: Ord,
    {
        BalancerBuilder::new()
    }
}

/// Builder for [`Balancer`].
///
/// # Example
///
/// ```rust
/// use maglev::{BalancerBuilder, Endpoint, SipHasher};
///
/// let balancer = BalancerBuilder::<Endpoint>::new()
///     .with_table_size(1009)
///     .with_hasher(SipHasher)
///     .add_cell(Endpoint::new("10.0.0.1", 80))
///     .add_cell(Endpoint::new("10.0.0.2", 80))
///     .build()
///     .unwrap();
///
/// assert_eq!(balancer.table_size(), 1009);
/// ```
pub struct BalancerBuilder<C, H = Murmur3Hasher> {
    cells: Vec<Arc<C>>,
    config: BalancerConfig,
    hasher: H,
    comparator: Comparator<C>,
}

impl<C: Cell + Ord> BalancerBuilder<C, Murmur3Hasher> {
    /// Builder using the cells' `Ord` order, default config and murmur3.
    pub fn new() -> Self {
        Self::ordered_by(|a: &C, b: &C| a.cmp(b))
    }
}

impl<C: Cell + Ord> Default for BalancerBuilder<C, Murmur3Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Cell> BalancerBuilder<C, Murmur3Hasher> {
    /// Builder ordering cells with `comparator`.
    pub fn ordered_by<F>(comparator: F) -> Self
    where
        F: Fn(&C, &C) -> Ordering + Send + Sync + 'static,
    {
        Self {
            cells: Vec::new(),
            config: BalancerConfig::default(),
            hasher: Murmur3Hasher,
            comparator: Arc::new(comparator),
        }
    }
}

impl<C: Cell, H: SlotHasher> BalancerBuilder<C, H> {
    pub fn with_table_size(mut self, table_size: u32) -> Self {
        self.config.table_size = table_size;
        self
    }

    pub fn with_seeds(mut self, seeds: HashSeeds) -> Self {
        self.config.seeds = seeds;
        self
    }

    pub fn with_config(mut self, config: BalancerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the hash family.
    pub fn with_hasher<H2: SlotHasher>(self, hasher: H2) -> BalancerBuilder<C, H2> {
        BalancerBuilder {
            cells: self.cells,
            config: self.config,
            hasher,
            comparator: self.comparator,
        }
    }

    /// Replaces the cell order.
    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&C, &C) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Arc::new(comparator);
        self
    }

    pub fn add_cell(mut self, cell: impl Into<Arc<C>>) -> Self {
        self.cells.push(cell.into());
        self
    }

    pub fn add_cells<I>(mut self, cells: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<C>>,
    {
        self.cells.extend(cells.into_iter().map(Into::into));
        self
    }

    /// Validates the configuration and builds the first table.
    pub fn build(self) -> Result<Balancer<C, H>> {
        Balancer::from_parts(self.cells, self.config, self.hasher, self.comparator)
    }
}
