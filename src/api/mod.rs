// HTTP and WebSocket APIs

mod ingestion;
pub mod query;
pub mod websocket;

use crate::store::TagStore;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use ingestion::{create_ingestion_router, IngestResponse};
pub use query::create_query_router;
pub use websocket::{create_ws_router, ws_handler};

/// Shared state for the API routers
pub struct ApiState {
    pub store: Arc<TagStore>,
}

/// Full API: payload ingestion, tag queries and WebSocket subscriptions
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(create_ingestion_router(Arc::clone(&state)))
        .merge(create_query_router(Arc::clone(&state)))
        .merge(create_ws_router(state))
        .layer(CorsLayer::permissive())
}
