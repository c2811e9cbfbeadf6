use crate::api::ApiState;
use crate::point::{normalize_tag, DataPoint, TagValue};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for tag listing
#[derive(Deserialize)]
pub struct TagQueryParams {
    /// Filter by tag prefix (case-insensitive, e.g., ?prefix=games.0)
    pub prefix: Option<String>,
}

/// Data point response
#[derive(Debug, Serialize)]
pub struct DataPointResponse {
    pub tag: String,
    pub value: TagValue,
    pub timestamp: String,
    pub valid: bool,
}

impl From<DataPoint> for DataPointResponse {
    fn from(point: DataPoint) -> Self {
        Self {
            valid: point.is_valid(),
            tag: point.tag,
            value: point.value,
            timestamp: point.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Store counters
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub tags: usize,
    pub published: u64,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create query API router
pub fn create_query_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/tags", get(list_points))
        .route("/api/tags/:tag", get(get_point))
        .route("/api/stats", get(get_stats))
        .with_state(state)
}

/// GET /api/tags - Latest point of every tag, ordered by tag
async fn list_points(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<TagQueryParams>,
) -> Json<Vec<DataPointResponse>> {
    let prefix = params.prefix.as_deref().map(normalize_tag);

    let response: Vec<DataPointResponse> = state
        .store
        .snapshot()
        .into_iter()
        .filter(|point| match prefix {
            Some(ref prefix) => point.normalized_tag().starts_with(prefix.as_str()),
            None => true,
        })
        .map(DataPointResponse::from)
        .collect();

    Json(response)
}

/// GET /api/tags/:tag - Latest point for one tag
async fn get_point(
    State(state): State<Arc<ApiState>>,
    Path(tag): Path<String>,
) -> Result<Json<DataPointResponse>, QueryError> {
    let point = state.store.get_point(&tag);

    // Markers are published without a value but still have a tag
    if point.tag.is_empty() {
        return Err(QueryError::NotFound);
    }

    Ok(Json(DataPointResponse::from(point)))
}

/// GET /api/stats - Store counters
async fn get_stats(State(state): State<Arc<ApiState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        tags: state.store.len(),
        published: state.store.published_count(),
    })
}

/// Query error types
#[derive(Debug)]
enum QueryError {
    NotFound,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            QueryError::NotFound => (StatusCode::NOT_FOUND, "Tag not found"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}
