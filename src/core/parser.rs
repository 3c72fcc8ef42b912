//! Parser for push-channel messages from the data service
//!
//! Two message shapes arrive over the channel: a one-time `initial` snapshot
//! and per-transaction `update` pushes. A malformed element inside an
//! `initial` batch is skipped on its own; it never poisons the rest of the
//! batch.

use serde_json::Value;
use tracing::{trace, warn};

use super::transaction::Transaction;

/// A decoded push-channel message.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    /// Full snapshot, sent once per connection.
    Initial(Vec<Transaction>),
    /// One newly observed transaction.
    Update(Box<Transaction>),
}

/// Parse a raw channel frame.
///
/// Returns `None` for frames that are not transaction messages (unknown
/// types, malformed JSON); those are logged and dropped.
pub fn parse_message(msg: &str) -> Option<ChannelMessage> {
    trace!(len = msg.len(), "Parsing channel frame");

    let json: Value = serde_json::from_str(msg)
        .map_err(|e| {
            warn!(error = %e, "Failed to parse channel JSON");
        })
        .ok()?;

    let msg_type = json["type"].as_str()?;
    match msg_type {
        "initial" => {
            let elements = json["data"].as_array()?;
            let mut transactions = Vec::with_capacity(elements.len());
            for element in elements {
                match serde_json::from_value::<Transaction>(element.clone()) {
                    Ok(tx) => transactions.push(tx),
                    Err(e) => {
                        // Bad record isolated; the rest of the batch stands.
                        warn!(error = %e, "Skipping malformed record in initial batch");
                    }
                }
            }
            Some(ChannelMessage::Initial(transactions))
        }
        "update" => {
            let tx: Transaction = serde_json::from_value(json["data"].clone())
                .map_err(|e| {
                    warn!(error = %e, "Failed to parse update record");
                })
                .ok()?;
            Some(ChannelMessage::Update(Box::new(tx)))
        }
        other => {
            trace!(msg_type = other, "Ignoring non-transaction message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update() {
        let msg = r#"{
            "type": "update",
            "data": {
                "hash": "abc123",
                "amount": 42.0,
                "timestamp": 1700000000,
                "toAddress": "wallet1"
            }
        }"#;

        match parse_message(msg) {
            Some(ChannelMessage::Update(tx)) => {
                assert_eq!(tx.hash, "abc123");
                assert_eq!(tx.amount, 42.0);
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_initial_batch() {
        let msg = r#"{
            "type": "initial",
            "data": [
                {"hash": "a", "amount": 1.0, "timestamp": 1, "toAddress": "w"},
                {"hash": "b", "amount": 2.0, "timestamp": 2, "toAddress": "w"}
            ]
        }"#;

        match parse_message(msg) {
            Some(ChannelMessage::Initial(txs)) => {
                assert_eq!(txs.len(), 2);
                assert_eq!(txs[0].hash, "a");
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_element_isolated() {
        let msg = r#"{
            "type": "initial",
            "data": [
                {"hash": "a", "amount": 1.0},
                {"amount": "not a number"},
                {"hash": "c", "amount": 3.0}
            ]
        }"#;

        match parse_message(msg) {
            Some(ChannelMessage::Initial(txs)) => {
                let hashes: Vec<_> = txs.iter().map(|t| t.hash.as_str()).collect();
                assert_eq!(hashes, vec!["a", "c"]);
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn test_ignores_unknown_type() {
        assert_eq!(parse_message(r#"{"type": "ping"}"#), None);
    }

    #[test]
    fn test_ignores_malformed_json() {
        assert_eq!(parse_message("{not json"), None);
    }
}
