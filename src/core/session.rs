//! Session state for one live view of the universe
//!
//! Owns the deduplicated working set, the seen-hash guard, the grouper
//! configuration and the layout cache as explicit state, so independent
//! sessions (and tests) never cross-contaminate.
//!
//! Streaming updates are applied one at a time in arrival order; each apply
//! is a full regroup over the union of everything seen, so the incremental
//! path can never diverge from the initial-load path. Hosts receiving bursts
//! should prefer `add_batch`, which coalesces into a single regroup.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::grouper::{group, Galaxy, GrouperConfig, GroupingResult};
use super::layout::{LayoutCache, LayoutConfig, Position};
use super::transaction::Transaction;
use crate::errors::CelestiaError;

pub struct UniverseSession {
    grouper: GrouperConfig,
    /// Deduplicated transactions, in arrival order.
    working_set: Vec<Transaction>,
    /// Hashes already admitted; duplicates are a silent no-op.
    seen: HashSet<String>,
    layout: LayoutCache,
    current: GroupingResult,
}

impl UniverseSession {
    pub fn new(grouper: GrouperConfig, layout: LayoutConfig) -> Self {
        Self {
            grouper,
            working_set: Vec::new(),
            seen: HashSet::new(),
            layout: LayoutCache::new(layout),
            current: GroupingResult::default(),
        }
    }

    /// Session with a fixed layout-jitter seed, for reproducible placement.
    pub fn with_seed(grouper: GrouperConfig, layout: LayoutConfig, seed: u64) -> Self {
        Self {
            grouper,
            working_set: Vec::new(),
            seen: HashSet::new(),
            layout: LayoutCache::with_seed(layout, seed),
            current: GroupingResult::default(),
        }
    }

    /// Populate from the startup fetch. Returns the number of records
    /// admitted after validation and dedup.
    pub fn load_initial(&mut self, transactions: Vec<Transaction>) -> usize {
        let admitted = self.admit_all(transactions);
        self.regroup();
        info!(
            admitted,
            galaxies = self.current.galaxies.len(),
            solitary = self.current.solitary.len(),
            "Initial load complete"
        );
        admitted
    }

    /// Apply one streamed transaction.
    ///
    /// Equivalent to regrouping the union of everything seen plus this
    /// record. Returns `Ok(false)` for a duplicate hash (a no-op, not an
    /// error); `Err(InvalidRecord)` for a malformed record, which leaves
    /// the session untouched.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<bool, CelestiaError> {
        tx.validate()?;
        if !self.seen.insert(tx.hash.clone()) {
            debug!(hash = %tx.hash, "Duplicate transaction ignored");
            return Ok(false);
        }
        debug!(hash = %tx.hash, amount = tx.amount, "Transaction admitted");
        self.working_set.push(tx);
        self.regroup();
        Ok(true)
    }

    /// Apply a burst of streamed transactions with a single regroup.
    ///
    /// Records are admitted in arrival order so first-write-wins dedup
    /// matches the one-at-a-time path. Malformed records are skipped and
    /// logged, never fatal to the batch. Returns the number admitted.
    pub fn add_batch(&mut self, transactions: Vec<Transaction>) -> usize {
        let admitted = self.admit_all(transactions);
        if admitted > 0 {
            self.regroup();
        }
        admitted
    }

    fn admit_all(&mut self, transactions: Vec<Transaction>) -> usize {
        let mut admitted = 0;
        for tx in transactions {
            if let Err(e) = tx.validate() {
                warn!(error = %e, "Skipping malformed record");
                continue;
            }
            if !self.seen.insert(tx.hash.clone()) {
                debug!(hash = %tx.hash, "Duplicate transaction ignored");
                continue;
            }
            self.working_set.push(tx);
            admitted += 1;
        }
        admitted
    }

    fn regroup(&mut self) {
        self.current = group(&self.working_set, &self.grouper);
    }

    pub fn galaxies(&self) -> &[Galaxy] {
        &self.current.galaxies
    }

    pub fn solitary(&self) -> &[Transaction] {
        &self.current.solitary
    }

    /// Stable position for renderable item `index`, where galaxies occupy
    /// indices `0..galaxies.len()` and solitary planets follow.
    pub fn position_for(&mut self, index: usize) -> Position {
        let total = self.current.item_count();
        self.layout.position_for(index, total)
    }

    /// All current items paired with their stable positions, in index
    /// order: galaxies first, then solitary planets.
    pub fn placements(&mut self) -> Vec<Position> {
        (0..self.current.item_count())
            .map(|i| self.position_for(i))
            .collect()
    }

    /// Mean galaxy fullness against the soft target, for the stats line.
    pub fn mean_fullness(&self) -> f64 {
        if self.current.galaxies.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .current
            .galaxies
            .iter()
            .map(|g| g.fullness(self.grouper.target_capacity))
            .sum();
        sum / self.current.galaxies.len() as f64
    }

    /// Read-only wallet filter over `to_address`.
    pub fn transactions_to(&self, address: &str) -> Vec<&Transaction> {
        self.working_set
            .iter()
            .filter(|tx| tx.to_address == address)
            .collect()
    }

    /// Number of unique transactions admitted so far.
    pub fn len(&self) -> usize {
        self.working_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working_set.is_empty()
    }
}
