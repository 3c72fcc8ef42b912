//! Error taxonomy for the ingestion boundary
//!
//! The grouper and layout assigner never fail for validated input; all
//! fallible paths live at the edges (record validation, REST bootstrap,
//! push channel). Duplicate hashes are a silent no-op, not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CelestiaError {
    /// Malformed transaction record. Skipped and logged, never fatal to
    /// the batch it arrived in.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// Initial paginated load from the data service failed.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetchFailed(String),
    /// Push channel down (dropped, errored, or retry budget spent);
    /// surfaced to the host via `ChannelState::as_result`.
    #[error("channel disconnected: {0}")]
    ChannelDisconnected(String),
}
