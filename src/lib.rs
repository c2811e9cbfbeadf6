// Flat data points and tag naming
pub mod point;

// Tree-to-tag flattening
pub mod flatten;

// Latest values and subscriber fan-out
pub mod store;

// Payload ingestion
pub mod ingest;

// Card reader event source
pub mod card;

// Configuration
pub mod config;

// HTTP and WebSocket APIs
pub mod api;

// WebSocket subscription management
pub mod subscription;

pub use point::{DataPoint, TagValue};
pub use store::{TagStore, TagSubscriber};
