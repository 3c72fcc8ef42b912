//! Shared push-channel connection state

use crate::errors::CelestiaError;

/// Connection state of the push channel, shared between the background
/// client and the host.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelState {
    Connecting,
    Connected,
    Disconnected,
    /// Waiting out a backoff delay before reconnect attempt `attempt`.
    Retrying { attempt: u32 },
    /// Retry budget spent; the channel stays down until the host
    /// explicitly reconnects.
    Exhausted,
    Error(String),
}

impl ChannelState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ChannelState::Connected)
    }

    /// True once the channel will make no further attempts on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChannelState::Exhausted)
    }

    /// Host-facing view of the channel: a down channel surfaces as
    /// `ChannelDisconnected`, live or retrying states as `Ok`.
    pub fn as_result(&self) -> Result<(), CelestiaError> {
        match self {
            ChannelState::Connecting
            | ChannelState::Connected
            | ChannelState::Retrying { .. } => Ok(()),
            ChannelState::Disconnected => Err(CelestiaError::ChannelDisconnected(
                "closed by server".into(),
            )),
            ChannelState::Exhausted => Err(CelestiaError::ChannelDisconnected(
                "retry budget exhausted".into(),
            )),
            ChannelState::Error(e) => Err(CelestiaError::ChannelDisconnected(e.clone())),
        }
    }
}
