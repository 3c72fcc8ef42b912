//! Startup loader for the stored transaction set
//!
//! Pages through `GET {base}/transactions?offset&limit` on the data service
//! until the full set is fetched. A failure here is surfaced as
//! `UpstreamFetchFailed`; the host decides whether to retry.

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::Transaction;
use crate::errors::CelestiaError;

/// One page of the paginated transaction listing.
#[derive(Debug, Deserialize)]
pub(crate) struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: u64,
}

/// Fetch the full stored transaction set, page by page.
pub async fn fetch_all(
    base_url: &str,
    page_size: usize,
) -> Result<Vec<Transaction>, CelestiaError> {
    let client = reqwest::Client::new();
    let url = format!("{}/transactions", base_url.trim_end_matches('/'));

    let mut all = Vec::new();
    let mut offset = 0usize;

    loop {
        let page: TransactionPage = client
            .get(&url)
            .query(&[("offset", offset), ("limit", page_size)])
            .send()
            .await
            .map_err(|e| CelestiaError::UpstreamFetchFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| CelestiaError::UpstreamFetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| CelestiaError::UpstreamFetchFailed(e.to_string()))?;

        let fetched = page.transactions.len();
        all.extend(page.transactions);
        offset += fetched;

        debug!(offset, total = page.total, "Fetched transaction page");

        // Empty page guards against a service reporting a stale total.
        if fetched == 0 || offset as u64 >= page.total {
            break;
        }
    }

    info!(count = all.len(), "Startup fetch complete");
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_deserialize() {
        let json = r#"{
            "transactions": [
                {"hash": "a", "amount": 1.5, "timestamp": 10, "toAddress": "w"}
            ],
            "total": 37
        }"#;
        let page: TransactionPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.transactions.len(), 1);
        assert_eq!(page.total, 37);
    }
}
