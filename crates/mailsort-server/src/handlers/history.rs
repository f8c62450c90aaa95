//! Classification history handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use mailsort_core::history::DEFAULT_RECENT_LIMIT;
use mailsort_core::HistoryEntry;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Most recent entries to return (default 10, 0 = all)
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Oldest first
    pub history: Vec<HistoryEntry>,
    /// Entries currently held
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// GET /history - Recent classifications
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Json(HistoryResponse {
        history: state.history.recent(limit),
        total: state.history.total(),
    })
}

/// DELETE /history - Drop all recorded classifications
pub async fn clear_history(State(state): State<Arc<AppState>>) -> Json<ClearHistoryResponse> {
    let cleared = state.history.total();
    state.history.clear();
    info!(cleared, "Classification history cleared");

    Json(ClearHistoryResponse {
        message: "History cleared",
        status: "success",
    })
}
