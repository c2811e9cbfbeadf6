//! Best-effort ingestion of structured payloads into a [`TagStore`].
//!
//! Nothing here reports failure to the caller: a payload that cannot be
//! parsed, or that is not a JSON object, simply contributes no points.

use crate::flatten::flatten_document;
use crate::point::now_millis;
use crate::store::TagStore;
use serde_json::Value;
use tracing::{debug, warn};

/// Parse `payload` as JSON, flatten it and publish every resulting point.
///
/// Returns the number of points published.
pub fn ingest_payload(store: &TagStore, payload: &[u8]) -> usize {
    let document: Value = match serde_json::from_slice(payload) {
        Ok(document) => document,
        Err(e) => {
            debug!(error = %e, bytes = payload.len(), "Discarding unparseable payload");
            return 0;
        }
    };

    if !document.is_object() {
        debug!("Discarding payload whose top level is not an object");
        return 0;
    }

    let points = flatten_document(&document, now_millis());
    let count = points.len();
    for point in points {
        store.publish(point);
    }

    debug!(points = count, "Ingested payload");
    count
}

/// Ingest a reply body according to its HTTP status.
///
/// Successful replies are ingested, as are 400 and 500 replies (their bodies
/// describe the error). Anything else is logged and dropped.
pub fn ingest_reply(store: &TagStore, status: u16, body: &[u8]) -> usize {
    match status {
        200..=299 | 400 | 500 => ingest_payload(store, body),
        _ => {
            warn!(status = status, "Dropping reply with unexpected status");
            0
        }
    }
}
