// Tag store: latest values and subscriber fan-out

mod engine;
mod subscriber;

pub use engine::TagStore;
pub use subscriber::{SubscriberId, TagSubscriber};
