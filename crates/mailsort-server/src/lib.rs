//! Mailsort Web Server
//!
//! Axum-based REST API for the Mailsort support-email classifier.
//!
//! - Single and batch classification with keyword fallback
//! - Training corpus, departments and evaluation metrics
//! - Bounded in-memory classification history
//! - Permissive CORS unless origins are configured
//! - JSON error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use mailsort_core::{ClassificationHistory, EmailClassifier, ModelBackend};

mod handlers;

/// Maximum emails accepted by one batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = any origin)
    pub allowed_origins: Vec<String>,
    /// Entries kept in the classification history
    pub history_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            history_capacity: mailsort_core::history::DEFAULT_CAPACITY,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub classifier: EmailClassifier,
    pub history: ClassificationHistory,
    pub config: ServerConfig,
}

/// Build the router around a ready classifier
pub fn create_router(classifier: EmailClassifier, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        classifier,
        history: ClassificationHistory::new(config.history_capacity),
        config: config.clone(),
    });

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Classification
        .route("/classify", post(handlers::classify_email))
        .route("/classify/batch", post(handlers::classify_batch))
        // Corpus
        .route("/training-data", get(handlers::training_data))
        .route("/departments", get(handlers::list_departments))
        // History
        .route(
            "/history",
            get(handlers::get_history).delete(handlers::clear_history),
        )
        // Evaluation
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(classifier: EmailClassifier, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(classifier, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    classifier: EmailClassifier,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    check_ai_connection(&classifier).await;
    info!(
        examples = classifier.corpus().len(),
        history_capacity = config.history_capacity,
        "Classifier ready"
    );

    let app = create_router(classifier, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log model backend connection status
async fn check_ai_connection(classifier: &EmailClassifier) {
    match classifier.ai() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ Model backend connected: {} ({})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  Model backend configured but not responding: {} ({}); keyword rules will answer on failure",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  Model backend not configured (set AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_API_KEY to enable), using keyword rules");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error rendered as `{"error": msg}`
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}
