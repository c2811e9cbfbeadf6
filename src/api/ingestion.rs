use crate::api::ApiState;
use crate::ingest::ingest_payload;
use axum::{body::Bytes, extract::State, response::Json, routing::post, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Ingestion response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Points published from the payload (0 when it was discarded)
    pub points: usize,
}

/// Create ingestion router
pub fn create_ingestion_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/payloads", post(ingest))
        .with_state(state)
}

/// POST /api/payloads - Flatten a JSON document into the store.
///
/// Malformed or non-object documents are accepted and contribute nothing.
async fn ingest(State(state): State<Arc<ApiState>>, body: Bytes) -> Json<IngestResponse> {
    let points = ingest_payload(&state.store, &body);

    info!(bytes = body.len(), points = points, "Ingested payload");

    Json(IngestResponse { points })
}
