//! Platform-agnostic core: grouping, layout and session state

pub mod grouper;
pub mod layout;
pub mod parser;
pub mod session;
pub mod transaction;

pub use grouper::{group, Galaxy, GrouperConfig, GroupingResult};
pub use layout::{LayoutCache, LayoutConfig, Position};
pub use parser::{parse_message, ChannelMessage};
pub use session::UniverseSession;
pub use transaction::Transaction;
