//! Ranking session API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use gamerank_core::{
    config::RankingMode, Aggregator, BatchReport, PaginationCursor, RankedRecord, RankingError,
    SessionInfo,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NextBatchRequest {
    /// Overrides `ranking.batch_size`.
    #[serde(default)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoadAllRequest {
    /// Overrides `ranking.bulk_size`.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub session: SessionInfo,
    pub has_more: bool,
    pub cursor: PaginationCursor,
    pub records: Vec<RankedRecord>,
}

impl From<&Aggregator> for RankingsResponse {
    fn from(aggregator: &Aggregator) -> Self {
        Self {
            session: aggregator.session(),
            has_more: aggregator.has_more(),
            cursor: aggregator.cursor(),
            records: aggregator.ranked().records().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub report: BatchReport,
    pub rankings: RankingsResponse,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn batch_failure(error: RankingError) -> ApiError {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/rankings
pub async fn get_rankings(State(state): State<Arc<AppState>>) -> Json<RankingsResponse> {
    let aggregator = state.aggregator().lock().await;
    Json(RankingsResponse::from(&*aggregator))
}

/// POST /api/v1/rankings/next
///
/// Load the next batch. In bulk mode the first call performs the bulk load
/// and later calls add nothing.
pub async fn load_next(
    State(state): State<Arc<AppState>>,
    body: Option<Json<NextBatchRequest>>,
) -> Result<Json<BatchResponse>, ApiError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let ranking = &state.config().ranking;
    let mut aggregator = state.aggregator().lock().await;

    let result = if ranking.mode == RankingMode::Bulk && aggregator.session().pages_fetched == 0 {
        aggregator.load_all(ranking.bulk_size).await
    } else {
        aggregator
            .load_next_batch(request.batch_size.unwrap_or(ranking.batch_size))
            .await
    };
    let report = result.map_err(batch_failure)?;

    Ok(Json(BatchResponse {
        report,
        rankings: RankingsResponse::from(&*aggregator),
    }))
}

/// POST /api/v1/rankings/reset
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<RankingsResponse> {
    let mut aggregator = state.aggregator().lock().await;
    aggregator.reset();
    info!("Ranking session reset: {}", aggregator.session().id);
    Json(RankingsResponse::from(&*aggregator))
}

/// POST /api/v1/rankings/load-all
///
/// Replace the session with one bulk load. On failure the previous session
/// is kept.
pub async fn load_all(
    State(state): State<Arc<AppState>>,
    body: Option<Json<LoadAllRequest>>,
) -> Result<Json<BatchResponse>, ApiError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let limit = request.limit.unwrap_or(state.config().ranking.bulk_size);
    let mut aggregator = state.aggregator().lock().await;

    let report = aggregator.load_all(limit).await.map_err(batch_failure)?;

    Ok(Json(BatchResponse {
        report,
        rankings: RankingsResponse::from(&*aggregator),
    }))
}
