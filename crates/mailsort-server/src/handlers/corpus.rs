//! Training corpus and department handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use mailsort_core::{Department, LabeledEmail};

#[derive(Debug, Serialize)]
pub struct TrainingDataResponse {
    pub emails: Vec<LabeledEmail>,
    pub total_count: usize,
    /// Distinct labels present in the corpus, sorted by name
    pub labels: Vec<Department>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentsResponse {
    pub departments: &'static [Department],
    pub total: usize,
}

/// GET /training-data - The labeled corpus the classifier was built with
pub async fn training_data(State(state): State<Arc<AppState>>) -> Json<TrainingDataResponse> {
    let corpus = state.classifier.corpus();
    Json(TrainingDataResponse {
        emails: corpus.examples().to_vec(),
        total_count: corpus.len(),
        labels: corpus.labels(),
    })
}

/// GET /departments - The fixed department set
pub async fn list_departments(State(state): State<Arc<AppState>>) -> Json<DepartmentsResponse> {
    let departments = state.classifier.departments();
    Json(DepartmentsResponse {
        departments,
        total: departments.len(),
    })
}
