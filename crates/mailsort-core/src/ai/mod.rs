//! Pluggable chat-model backend abstraction
//!
//! # Architecture
//!
//! - `ModelBackend` trait: one chat completion per classification
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `AzureOpenAIBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//!
//! if let Some(ref client) = ai {
//!     let raw = client.classify_via_model(Some(system), &prompt).await?;
//!     let department = parse_department(&raw)?;
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (azure, openai_compatible, mock). Default: azure
//! - `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`: required for azure
//! - `AZURE_OPENAI_API_VERSION`, `AZURE_OPENAI_DEPLOYMENT`: optional
//! - `OPENAI_COMPATIBLE_HOST`: required for openai_compatible
//! - `OPENAI_COMPATIBLE_MODEL`, `OPENAI_COMPATIBLE_API_KEY`: optional
//!
//! Empty values count as unset. A backend with missing settings yields no
//! client, and classification runs on keyword rules alone.

mod azure_openai;
mod mock;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use azure_openai::AzureOpenAIBackend;
pub use mock::{MockBackend, MockReply};
pub use openai_compatible::OpenAICompatibleBackend;
pub use parsing::parse_department;
pub use types::ChatSettings;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait defining the interface for all model backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send one chat completion and return the raw answer text
    ///
    /// Network, auth, timeout, non-2xx and malformed-body failures are
    /// reported as transport errors (`Error::is_transport`).
    async fn classify_via_model(&self, system: Option<&str>, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model (or deployment) name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Azure OpenAI chat deployment
    Azure(AzureOpenAIBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl std::fmt::Debug for AIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AIClient")
            .field("backend", &self.backend_name())
            .field("model", &self.model())
            .field("host", &self.host())
            .finish()
    }
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Returns None if the selected backend is not fully configured.
    pub fn from_env() -> Option<Self> {
        match Self::try_from_env() {
            Ok(client) => {
                tracing::info!(
                    backend = client.backend_name(),
                    model = client.model(),
                    host = client.host(),
                    "Model backend configured"
                );
                Some(client)
            }
            Err(e) => {
                tracing::info!("{}; using keyword rules only", e);
                None
            }
        }
    }

    /// Like `from_env`, but reports which setting is missing
    pub fn try_from_env() -> Result<Self> {
        let backend = env_non_empty("AI_BACKEND").unwrap_or_else(|| "azure".to_string());

        match backend.to_lowercase().as_str() {
            "azure" | "azure_openai" => AzureOpenAIBackend::from_env()
                .map(AIClient::Azure)
                .ok_or_else(|| {
                    Error::ConfigurationMissing(
                        "AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_API_KEY must be set".into(),
                    )
                }),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env()
                    .map(AIClient::OpenAICompatible)
                    .ok_or_else(|| {
                        Error::ConfigurationMissing("OPENAI_COMPATIBLE_HOST must be set".into())
                    })
            }
            "mock" => Ok(AIClient::Mock(MockBackend::new())),
            _ => Err(Error::ConfigurationMissing(format!(
                "unknown AI_BACKEND '{}'",
                backend
            ))),
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with different timeout and generation settings
    pub fn with_settings(&self, settings: ChatSettings) -> Self {
        match self {
            AIClient::Azure(b) => AIClient::Azure(b.with_settings(settings)),
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_settings(settings)),
            AIClient::Mock(b) => AIClient::Mock(b.clone()),
        }
    }

    /// Short backend name (for logging and status output)
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Azure(_) => "azure",
            AIClient::OpenAICompatible(_) => "openai_compatible",
            AIClient::Mock(_) => "mock",
        }
    }
}

// Implement ModelBackend for AIClient by delegating to the inner backend
#[async_trait]
impl ModelBackend for AIClient {
    async fn classify_via_model(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        match self {
            AIClient::Azure(b) => b.classify_via_model(system, prompt).await,
            AIClient::OpenAICompatible(b) => b.classify_via_model(system, prompt).await,
            AIClient::Mock(b) => b.classify_via_model(system, prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Azure(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Azure(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Azure(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

/// Read an environment variable, treating empty or whitespace values as unset
pub(crate) fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
