//! Celestia core - transaction-universe grouping and spatial layout
//!
//! Partitions a live stream of token-transfer transactions into
//! capacity-bounded "galaxies" plus oversized "solitary" planets, and
//! assigns each renderable item a stable position on a layered spiral.
//! The rendering layer consumes the (item, position) pairs; ingestion is
//! a paginated REST bootstrap plus a WebSocket push channel with bounded
//! reconnect.

pub mod channel_state;
pub mod core;
pub mod errors;
pub mod fetch;
pub mod websocket;

pub use channel_state::ChannelState;
pub use core::{
    group, parse_message, ChannelMessage, Galaxy, GrouperConfig, GroupingResult, LayoutCache,
    LayoutConfig, Position, Transaction, UniverseSession,
};
pub use errors::CelestiaError;
pub use fetch::fetch_all;
pub use websocket::{ChannelConfig, PushChannel};
