// WebSocket tag subscriptions

pub mod manager;
pub mod protocol;

pub use manager::{ConnectionManager, Forwarder};
pub use protocol::{ClientMessage, DataPointMessage, ErrorMessage};
