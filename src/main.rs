//! Standalone CLI for the Celestia data pipeline
//!
//! Bootstraps the working set over REST, then follows the push channel,
//! coalescing queued frames into one regroup pass per poll tick.
//!
//! Run with: cargo run --bin celestia-cli

use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use celestia_vis::{
    fetch_all, parse_message, ChannelConfig, ChannelMessage, GrouperConfig, LayoutConfig,
    PushChannel, UniverseSession,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,celestia_vis=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let api_url = std::env::var("CELESTIA_API")
        .unwrap_or_else(|_| "http://127.0.0.1:3001".to_string());
    let ws_url =
        std::env::var("CELESTIA_WS").unwrap_or_else(|_| "ws://127.0.0.1:3001/ws".to_string());

    let grouper = match std::env::var("CELESTIA_MAX_CAPACITY")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
    {
        Some(max) => GrouperConfig::with_max_capacity(max),
        None => GrouperConfig::default(),
    };

    let mut session = UniverseSession::new(grouper, LayoutConfig::default());

    info!(url = %api_url, "Loading stored transactions");
    match fetch_all(&api_url, 100).await {
        Ok(transactions) => {
            session.load_initial(transactions);
        }
        Err(e) => {
            // Live updates can still populate the view.
            error!(error = %e, "Initial load failed, continuing with live channel only");
        }
    }

    info!(url = %ws_url, "Following push channel");
    let channel = PushChannel::connect(&ws_url, ChannelConfig::default());

    let mut update_count = 0u64;
    let mut updates_last_interval = 0u64;
    let mut poll = tokio::time::interval(Duration::from_millis(250));
    let mut stats_interval = tokio::time::interval(Duration::from_secs(5));

    loop {
        tokio::select! {
            _ = poll.tick() => {
                // Drain everything queued since the last tick into one
                // batch; arrival order is preserved for dedup.
                let mut batch = Vec::new();
                let mut sender_gone = false;
                loop {
                    match channel.rx.try_recv() {
                        Ok(frame) => match parse_message(&frame) {
                            Some(ChannelMessage::Initial(txs)) => batch.extend(txs),
                            Some(ChannelMessage::Update(tx)) => batch.push(*tx),
                            None => {}
                        },
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            sender_gone = true;
                            break;
                        }
                    }
                }

                if !batch.is_empty() {
                    let received = batch.len();
                    let admitted = session.add_batch(batch);
                    update_count += admitted as u64;
                    updates_last_interval += admitted as u64;
                    info!(
                        received,
                        admitted,
                        galaxies = session.galaxies().len(),
                        solitary = session.solitary().len(),
                        "Applied update batch"
                    );
                }

                if sender_gone {
                    match channel.state.lock().as_result() {
                        Err(e) => warn!(error = %e, "Push channel down, exiting"),
                        Ok(()) => warn!("Push channel thread ended, exiting"),
                    }
                    break;
                }
            }
            _ = stats_interval.tick() => {
                info!(
                    transactions = session.len(),
                    galaxies = session.galaxies().len(),
                    solitary = session.solitary().len(),
                    updates = update_count,
                    fullness = format!("{:.2}", session.mean_fullness()),
                    "/sec" = format!("{:.1}", updates_last_interval as f64 / 5.0),
                    "stats"
                );
                updates_last_interval = 0;
            }
        }
    }

    Ok(())
}
