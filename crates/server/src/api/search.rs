//! Search API handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use gamerank_core::SearchResults;

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/search?q=
///
/// Searches the current session. A missing or blank `q` returns the whole
/// ranked list.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResults> {
    let aggregator = state.aggregator().lock().await;
    let results = state.search_index().search(&aggregator, &params.q).await;
    Json(results)
}
