//! Transaction data model
//!
//! Shared between the REST bootstrap loader, the push channel parser and
//! the grouping core. Records arrive as JSON from the data service and are
//! validated once at the ingestion boundary.

use serde::{Deserialize, Serialize};

use crate::errors::CelestiaError;

/// A token-transfer transaction as observed upstream.
///
/// Immutable once received; `hash` is the natural key for deduplication
/// across the working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction signature, the dedup key.
    pub hash: String,
    /// Transferred quantity; drives grouping and visual size.
    pub amount: f64,
    /// Unix timestamp (seconds) the transfer was observed.
    #[serde(default)]
    pub timestamp: u64,
    /// Destination wallet, carried read-only for ownership filtering.
    #[serde(rename = "toAddress", alias = "to_address", default)]
    pub to_address: String,
}

impl Transaction {
    /// Check the record is well-formed enough to enter the working set.
    ///
    /// A record needs a non-empty hash and a finite, non-negative amount.
    /// Everything else is tolerated.
    pub fn validate(&self) -> Result<(), CelestiaError> {
        if self.hash.is_empty() {
            return Err(CelestiaError::InvalidRecord("empty hash".into()));
        }
        if !self.amount.is_finite() {
            return Err(CelestiaError::InvalidRecord(format!(
                "non-finite amount for {}",
                self.hash
            )));
        }
        if self.amount < 0.0 {
            return Err(CelestiaError::InvalidRecord(format!(
                "negative amount {} for {}",
                self.amount, self.hash
            )));
        }
        Ok(())
    }
}
