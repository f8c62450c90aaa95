//! Test utilities for mailsort-core
//!
//! A mock chat-completions server speaking both the Azure OpenAI and the
//! OpenAI-compatible URL layouts, for exercising the real HTTP backends.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock server answers chat completions
#[derive(Debug, Clone)]
pub enum MockChatBehavior {
    /// 200 with this text as the first choice
    Reply(String),
    /// Respond with this status and a plain-text error body
    Status(u16),
    /// 200 with a body that is not a chat completion
    Garbage,
    /// Sleep, then reply
    Slow(Duration, String),
}

/// A request the server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct ServerState {
    behavior: MockChatBehavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock chat-completions server for testing
pub struct MockChatServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start a server that always answers `reply`
    pub async fn start(reply: &str) -> Self {
        Self::start_with(MockChatBehavior::Reply(reply.to_string())).await
    }

    /// Start the mock server on an available port
    pub async fn start_with(behavior: MockChatBehavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            behavior,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_openai_chat))
            .route(
                "/openai/deployments/:deployment/chat/completions",
                post(handle_azure_chat),
            )
            .route("/v1/models", get(handle_models))
            .route("/openai/models", get(handle_models))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_openai_chat(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    respond(state, "/v1/chat/completions".to_string(), headers, body).await
}

async fn handle_azure_chat(
    State(state): State<ServerState>,
    axum::extract::Path(deployment): axum::extract::Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let path = format!("/openai/deployments/{}/chat/completions", deployment);
    respond(state, path, headers, body).await
}

async fn respond(state: ServerState, path: String, headers: HeaderMap, body: Value) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        path,
        api_key: header("api-key"),
        authorization: header("authorization"),
        body,
    });

    match state.behavior {
        MockChatBehavior::Reply(reply) => Json(completion(&reply)).into_response(),
        MockChatBehavior::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "mock failure",
        )
            .into_response(),
        MockChatBehavior::Garbage => Json(json!({"unexpected": true})).into_response(),
        MockChatBehavior::Slow(delay, reply) => {
            tokio::time::sleep(delay).await;
            Json(completion(&reply)).into_response()
        }
    }
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Model listing (health check)
async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "mock-model", "object": "model"}]
    }))
}
