//! Classification handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState, MAX_BATCH_SIZE};
use mailsort_core::{ClassificationMethod, Department, Email, HistoryEntry};

/// Characters of the subject shown in previews
const SUBJECT_PREVIEW_CHARS: usize = 50;

/// Characters of the body shown in previews
const BODY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Serialize)]
pub struct EmailPreview {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub label: Department,
    pub confidence: f64,
    pub method: ClassificationMethod,
    pub timestamp: String,
    pub email_preview: EmailPreview,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub emails: Vec<Email>,
}

#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub label: Department,
    pub confidence: f64,
    pub method: ClassificationMethod,
    pub email: Email,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
}

/// First `max_chars` characters, with "..." when something was cut
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn validate_email(email: &Email) -> Result<(), AppError> {
    if email.subject.trim().is_empty() && email.body.trim().is_empty() {
        return Err(AppError::bad_request(
            "Email subject and body cannot both be empty",
        ));
    }
    if let Some(sender) = &email.sender {
        if !sender.contains('@') {
            return Err(AppError::bad_request("Invalid sender email address"));
        }
    }
    Ok(())
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(&rejection.body_text()))
}

/// POST /classify - Classify one email and record it in history
pub async fn classify_email(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Email>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let email = json_body(payload)?;
    validate_email(&email)?;

    let result = state.classifier.classify(&email).await;
    debug!(label = %result.label, method = %result.method, "Classified email");

    let subject_preview = preview(&email.subject, SUBJECT_PREVIEW_CHARS);
    let entry = HistoryEntry::new(&result, subject_preview.clone());
    let timestamp = entry.timestamp.to_rfc3339();
    state.history.record(entry);

    Ok(Json(ClassifyResponse {
        label: result.label,
        confidence: result.confidence,
        method: result.method,
        timestamp,
        email_preview: EmailPreview {
            subject: subject_preview,
            body: preview(&email.body, BODY_PREVIEW_CHARS),
        },
    }))
}

/// POST /classify/batch - Classify several emails, results in input order
pub async fn classify_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, AppError> {
    let request = json_body(payload)?;

    if request.emails.len() > MAX_BATCH_SIZE {
        return Err(AppError::bad_request(&format!(
            "Batch too large (max {} emails)",
            MAX_BATCH_SIZE
        )));
    }
    for email in &request.emails {
        validate_email(email)?;
    }

    let results = state
        .classifier
        .batch_classify_concurrent(&request.emails, state.classifier.config().max_parallel)
        .await;

    let results = request
        .emails
        .into_iter()
        .zip(results)
        .map(|(email, result)| BatchItem {
            label: result.label,
            confidence: result.confidence,
            method: result.method,
            email,
        })
        .collect();

    Ok(Json(BatchResponse { results }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("Krótki temat", 50), "Krótki temat");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "ż".repeat(60);
        let p = preview(&text, 50);
        assert_eq!(p.chars().count(), 53);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_exact_length_unchanged() {
        let text = "a".repeat(100);
        assert_eq!(preview(&text, 100), text);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(&Email::new("Temat", "")).is_ok());
        assert!(validate_email(&Email::new("", "Treść")).is_ok());
        assert!(validate_email(&Email::new(" ", "")).is_err());
        assert!(validate_email(&Email::new("a", "b").with_sender("jan@firma.pl")).is_ok());
        assert!(validate_email(&Email::new("a", "b").with_sender("jan")).is_err());
    }
}
