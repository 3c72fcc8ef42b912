//! Transaction grouper
//!
//! Partitions the working set into capacity-bounded "galaxies" plus a
//! "solitary" overflow set via greedy descending bin packing. Descending
//! order approximates minimal group count; exact packing is not a goal,
//! visually balanced clusters are.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, trace};

use super::transaction::Transaction;

/// Capacity knobs for the grouper.
///
/// `max_capacity` is the hard admission bound: a galaxy's running sum never
/// exceeds it, and any single transaction above it is solitary by
/// definition. `target_capacity` is a soft fullness target used as a tuning
/// knob by callers; it does not change the admission test.
#[derive(Debug, Clone, Copy)]
pub struct GrouperConfig {
    pub max_capacity: f64,
    pub target_capacity: f64,
}

impl Default for GrouperConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000.0,
            target_capacity: 750.0,
        }
    }
}

impl GrouperConfig {
    pub fn with_max_capacity(max_capacity: f64) -> Self {
        Self {
            max_capacity,
            target_capacity: max_capacity * 0.75,
        }
    }
}

/// A capacity-bounded cluster of transactions.
///
/// Immutable once produced; a regroup supersedes the whole list rather than
/// mutating galaxies in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Galaxy {
    /// Contained transactions, in packing order. Never empty.
    pub transactions: Vec<Transaction>,
    /// Sum of contained amounts. This is the same running sum the packer
    /// used for admission, so it cannot drift from the contents.
    pub total_amount: f64,
}

impl Galaxy {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Fullness relative to the soft target capacity; the renderer scales
    /// galaxy density by this.
    pub fn fullness(&self, target_capacity: f64) -> f64 {
        if target_capacity <= 0.0 {
            return 0.0;
        }
        self.total_amount / target_capacity
    }
}

/// Output of one grouping pass over a snapshot of the working set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingResult {
    pub galaxies: Vec<Galaxy>,
    /// Transactions too large to fit any galaxy.
    pub solitary: Vec<Transaction>,
}

impl GroupingResult {
    /// Number of renderable items (galaxies first, then solitary planets).
    pub fn item_count(&self) -> usize {
        self.galaxies.len() + self.solitary.len()
    }
}

/// Partition `transactions` into galaxies and solitary items.
///
/// Total over any collection of validated records. Duplicate hashes collapse
/// first-write-wins before packing; the result is deterministic (equal
/// amounts are ordered by hash).
pub fn group(transactions: &[Transaction], config: &GrouperConfig) -> GroupingResult {
    // Dedup by hash, first record wins.
    let mut seen: HashSet<&str> = HashSet::with_capacity(transactions.len());
    let mut unique: Vec<&Transaction> = Vec::with_capacity(transactions.len());
    for tx in transactions {
        if seen.insert(tx.hash.as_str()) {
            unique.push(tx);
        } else {
            trace!(hash = %tx.hash, "Duplicate hash collapsed");
        }
    }

    // Descending by amount, hash as tiebreaker so the order is total.
    unique.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.hash.cmp(&b.hash))
    });

    let mut galaxies: Vec<Galaxy> = Vec::new();
    let mut solitary: Vec<Transaction> = Vec::new();
    let mut current: Vec<Transaction> = Vec::new();
    let mut current_sum = 0.0_f64;

    for tx in unique {
        // Oversized items can never fit any galaxy.
        if tx.amount > config.max_capacity {
            solitary.push(tx.clone());
            continue;
        }

        if current_sum + tx.amount <= config.max_capacity {
            current_sum += tx.amount;
            current.push(tx.clone());
        } else {
            if !current.is_empty() {
                galaxies.push(Galaxy {
                    transactions: std::mem::take(&mut current),
                    total_amount: current_sum,
                });
            }
            current_sum = tx.amount;
            current.push(tx.clone());
        }
    }

    if !current.is_empty() {
        galaxies.push(Galaxy {
            transactions: current,
            total_amount: current_sum,
        });
    }

    debug!(
        input = transactions.len(),
        unique = seen.len(),
        galaxies = galaxies.len(),
        solitary = solitary.len(),
        "Grouped working set"
    );

    GroupingResult { galaxies, solitary }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str, amount: f64) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            amount,
            timestamp: 0,
            to_address: String::new(),
        }
    }

    fn cfg(max: f64) -> GrouperConfig {
        GrouperConfig::with_max_capacity(max)
    }

    #[test]
    fn test_worked_example() {
        let txs = vec![tx("a", 60.0), tx("b", 50.0), tx("c", 40.0), tx("d", 150.0)];
        let result = group(&txs, &cfg(100.0));

        assert_eq!(result.solitary.len(), 1);
        assert_eq!(result.solitary[0].hash, "d");

        assert_eq!(result.galaxies.len(), 2);
        let hashes: Vec<Vec<&str>> = result
            .galaxies
            .iter()
            .map(|g| g.transactions.iter().map(|t| t.hash.as_str()).collect())
            .collect();
        assert_eq!(hashes, vec![vec!["a"], vec!["b", "c"]]);
        assert_eq!(result.galaxies[0].total_amount, 60.0);
        assert_eq!(result.galaxies[1].total_amount, 90.0);
    }

    #[test]
    fn test_empty_input() {
        let result = group(&[], &cfg(100.0));
        assert!(result.galaxies.is_empty());
        assert!(result.solitary.is_empty());
    }

    #[test]
    fn test_single_oversized() {
        let result = group(&[tx("big", 500.0)], &cfg(100.0));
        assert!(result.galaxies.is_empty());
        assert_eq!(result.solitary.len(), 1);
    }

    #[test]
    fn test_identical_amounts_single_group() {
        let txs: Vec<_> = (0..5).map(|i| tx(&format!("t{i}"), 10.0)).collect();
        let result = group(&txs, &cfg(100.0));
        assert_eq!(result.galaxies.len(), 1);
        assert_eq!(result.galaxies[0].len(), 5);
        assert_eq!(result.galaxies[0].total_amount, 50.0);
    }

    #[test]
    fn test_duplicate_hashes_collapse_first_wins() {
        let txs = vec![tx("x", 10.0), tx("x", 70.0)];
        let result = group(&txs, &cfg(100.0));
        assert_eq!(result.galaxies.len(), 1);
        assert_eq!(result.galaxies[0].len(), 1);
        assert_eq!(result.galaxies[0].transactions[0].amount, 10.0);
        assert_eq!(result.solitary.len(), 0);
    }

    #[test]
    fn test_unique_count_preserved() {
        // N records, K unique hashes: exactly K come out.
        let mut txs = Vec::new();
        for i in 0..20 {
            txs.push(tx(&format!("h{}", i % 7), (i % 7) as f64 * 30.0 + 5.0));
        }
        let result = group(&txs, &cfg(100.0));
        let out: usize = result.galaxies.iter().map(Galaxy::len).sum::<usize>()
            + result.solitary.len();
        assert_eq!(out, 7);
    }

    #[test]
    fn test_no_group_exceeds_capacity_and_none_empty() {
        let txs: Vec<_> = (0..50)
            .map(|i| tx(&format!("t{i}"), (i as f64 * 13.7) % 120.0))
            .collect();
        let config = cfg(100.0);
        let result = group(&txs, &config);
        for g in &result.galaxies {
            assert!(!g.is_empty());
            assert!(g.total_amount <= config.max_capacity + 1e-9);
            let sum: f64 = g.transactions.iter().map(|t| t.amount).sum();
            assert!((sum - g.total_amount).abs() < 1e-9);
        }
        for s in &result.solitary {
            assert!(s.amount > config.max_capacity);
        }
    }

    #[test]
    fn test_fullness_scales_with_target() {
        let txs = vec![tx("a", 60.0), tx("b", 30.0)];
        let result = group(&txs, &cfg(100.0));
        assert_eq!(result.galaxies.len(), 1);
        assert!((result.galaxies[0].fullness(75.0) - 1.2).abs() < 1e-9);
        assert_eq!(result.galaxies[0].fullness(0.0), 0.0);
    }

    #[test]
    fn test_deterministic() {
        let txs: Vec<_> = (0..30)
            .map(|i| tx(&format!("t{i}"), ((i * 37) % 90) as f64))
            .collect();
        let a = group(&txs, &cfg(100.0));
        let b = group(&txs, &cfg(100.0));
        assert_eq!(a, b);
    }
}
