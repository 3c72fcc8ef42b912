//! Native WebSocket client for the data-service push channel
//!
//! Uses tokio-tungstenite in a background thread, with channel-based
//! message passing. Reconnects on drop with exponential backoff; once the
//! retry budget is spent the channel reports `Exhausted` and stays down
//! until the host connects a fresh client.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::channel_state::ChannelState;

/// Reconnect policy for the push channel.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    /// Reconnect attempts before giving up.
    pub max_retries: u32,
    /// Delay before the first reconnect; doubles per attempt.
    pub initial_backoff: Duration,
    /// Ceiling for the doubling backoff.
    pub max_backoff: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// Delay before reconnect `attempt` (1-based): doubles from
/// `initial_backoff`, capped at `max_backoff`. `None` once the retry
/// budget is spent.
fn next_backoff(attempt: u32, config: &ChannelConfig) -> Option<Duration> {
    if attempt == 0 || attempt > config.max_retries {
        return None;
    }
    let exp = (attempt - 1).min(31);
    let delay = config
        .initial_backoff
        .saturating_mul(2u32.saturating_pow(exp));
    Some(delay.min(config.max_backoff))
}

/// How one connection's read loop ended.
enum ReadEnd {
    /// Host dropped the receiver; no point reconnecting.
    ReceiverGone,
    /// Server closed or the stream ran dry.
    Closed,
    Failed(String),
}

/// Push-channel client that runs in a background thread.
pub struct PushChannel {
    /// Receiver for raw message frames.
    pub rx: Receiver<String>,
    /// Shared connection state.
    pub state: Arc<Mutex<ChannelState>>,
}

impl PushChannel {
    /// Connect to the push channel endpoint.
    ///
    /// Spawns a background thread with a tokio runtime to own the
    /// connection and its reconnect loop. Frames arrive in order through
    /// the returned receiver.
    pub fn connect(url: &str, config: ChannelConfig) -> Self {
        let (tx, rx): (Sender<String>, Receiver<String>) = mpsc::channel();
        let state = Arc::new(Mutex::new(ChannelState::Connecting));

        let url = url.to_string();
        let state_clone = state.clone();

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "Failed to create tokio runtime");
                    *state_clone.lock() = ChannelState::Error(e.to_string());
                    return;
                }
            };
            rt.block_on(async move {
                Self::run(&url, config, tx, state_clone).await;
            });
        });

        Self { rx, state }
    }

    async fn run(
        url: &str,
        config: ChannelConfig,
        tx: Sender<String>,
        state: Arc<Mutex<ChannelState>>,
    ) {
        use tokio_tungstenite::connect_async;

        let mut attempt = 0u32;

        loop {
            info!(url, attempt, "Connecting to push channel");
            match connect_async(url).await {
                Ok((stream, _)) => {
                    info!("Push channel connected");
                    *state.lock() = ChannelState::Connected;
                    // Healthy connection resets the retry budget.
                    attempt = 0;

                    match Self::read_loop(stream, &tx).await {
                        ReadEnd::ReceiverGone => return,
                        ReadEnd::Closed => {
                            warn!("Push channel closed by server");
                            *state.lock() = ChannelState::Disconnected;
                        }
                        ReadEnd::Failed(e) => {
                            error!(error = %e, "Push channel error");
                            *state.lock() = ChannelState::Error(e);
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to connect");
                    *state.lock() = ChannelState::Error(e.to_string());
                }
            }

            attempt += 1;
            let Some(delay) = next_backoff(attempt, &config) else {
                warn!(attempt, "Retry budget exhausted, giving up");
                *state.lock() = ChannelState::Exhausted;
                return;
            };

            *state.lock() = ChannelState::Retrying { attempt };
            info!(attempt, delay = ?delay, "Reconnecting after backoff");
            tokio::time::sleep(delay).await;
        }
    }

    async fn read_loop(
        mut stream: tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        tx: &Sender<String>,
    ) -> ReadEnd {
        use futures_util::StreamExt;
        use tokio_tungstenite::tungstenite::Message;

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if tx.send(text.to_string()).is_err() {
                        return ReadEnd::ReceiverGone;
                    }
                }
                Ok(Message::Close(_)) => return ReadEnd::Closed,
                Err(e) => return ReadEnd::Failed(e.to_string()),
                _ => {}
            }
        }
        ReadEnd::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let config = ChannelConfig {
            max_retries: 8,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        };
        let delays: Vec<_> = (1..=8)
            .map(|attempt| next_backoff(attempt, &config).unwrap())
            .collect();
        assert_eq!(
            delays,
            [1, 2, 4, 8, 16, 30, 30, 30].map(Duration::from_secs)
        );
    }

    #[test]
    fn test_backoff_budget_spent() {
        let config = ChannelConfig::default();
        assert_eq!(
            next_backoff(config.max_retries, &config),
            Some(Duration::from_secs(16))
        );
        assert_eq!(next_backoff(config.max_retries + 1, &config), None);
    }

    #[test]
    fn test_backoff_rejects_attempt_zero() {
        // Attempts are 1-based; zero has no delay.
        assert_eq!(next_backoff(0, &ChannelConfig::default()), None);
    }

    #[test]
    fn test_backoff_no_overflow_on_large_attempt() {
        let config = ChannelConfig {
            max_retries: u32::MAX,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        };
        assert_eq!(
            next_backoff(1000, &config),
            Some(Duration::from_secs(30))
        );
    }
}
