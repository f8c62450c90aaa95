//! Evaluation metrics handler

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::AppState;
use mailsort_core::EvaluationMetrics;

/// GET /metrics - Classify the whole corpus and score it against the labels
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<EvaluationMetrics> {
    Json(state.classifier.evaluate().await)
}
