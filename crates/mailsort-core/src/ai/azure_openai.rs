//! Azure OpenAI backend implementation
//!
//! Calls a chat deployment at
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={v}`
//! authenticated with the `api-key` header.
//!
//! # Configuration
//!
//! Environment variables:
//! - `AZURE_OPENAI_ENDPOINT`: Resource URL (required)
//! - `AZURE_OPENAI_API_KEY`: API key (required)
//! - `AZURE_OPENAI_API_VERSION`: API version (default: 2024-08-01-preview)
//! - `AZURE_OPENAI_DEPLOYMENT`: Deployment name (default: gpt-4o-mini)

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::Result;

use super::types::{send_chat, ChatSettings};
use super::{env_non_empty, ModelBackend};

pub const DEFAULT_API_VERSION: &str = "2024-08-01-preview";
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o-mini";

/// Azure OpenAI chat deployment
#[derive(Clone)]
pub struct AzureOpenAIBackend {
    http_client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    settings: ChatSettings,
}

impl std::fmt::Debug for AzureOpenAIBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAIBackend")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl AzureOpenAIBackend {
    /// Create a backend for `deployment` on the resource at `endpoint`
    pub fn new(endpoint: &str, api_key: &str, deployment: &str) -> Self {
        let settings = ChatSettings::default();
        Self {
            http_client: settings.http_client(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            deployment: deployment.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            settings,
        }
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    /// Create a new instance with different request settings
    pub fn with_settings(&self, settings: ChatSettings) -> Self {
        Self {
            http_client: settings.http_client(),
            settings,
            ..self.clone()
        }
    }

    /// Create from environment variables
    ///
    /// Returns None unless both `AZURE_OPENAI_ENDPOINT` and
    /// `AZURE_OPENAI_API_KEY` are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let endpoint = env_non_empty("AZURE_OPENAI_ENDPOINT")?;
        let api_key = env_non_empty("AZURE_OPENAI_API_KEY")?;
        let deployment = env_non_empty("AZURE_OPENAI_DEPLOYMENT")
            .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string());
        let api_version = env_non_empty("AZURE_OPENAI_API_VERSION")
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        Some(Self::new(&endpoint, &api_key, &deployment).with_api_version(&api_version))
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl ModelBackend for AzureOpenAIBackend {
    async fn classify_via_model(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let request = self.settings.request(None, system, prompt);

        let req_builder = self
            .http_client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&request);

        debug!(endpoint = %self.endpoint, deployment = %self.deployment, "Sending chat completion");
        send_chat(req_builder, "Azure OpenAI").await
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!(
                "{}/openai/models?api-version={}",
                self.endpoint, self.api_version
            ))
            .header("api-key", &self.api_key)
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.deployment
    }

    fn host(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let backend =
            AzureOpenAIBackend::new("https://example.openai.azure.com/", "key", "gpt-4o-mini");
        assert_eq!(
            backend.completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-08-01-preview"
        );
    }

    #[test]
    fn test_with_api_version() {
        let backend = AzureOpenAIBackend::new("https://x", "key", "dep").with_api_version("2024-02-01");
        assert_eq!(backend.api_version(), "2024-02-01");
        assert_eq!(backend.model(), "dep");
        assert_eq!(backend.host(), "https://x");
    }

    #[test]
    fn test_debug_hides_key() {
        let backend = AzureOpenAIBackend::new("https://x", "super-secret", "dep");
        assert!(!format!("{:?}", backend).contains("super-secret"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let backend = AzureOpenAIBackend::new("http://127.0.0.1:1", "key", "dep");
        let err = backend.classify_via_model(Some("sys"), "test").await.unwrap_err();
        assert!(err.is_transport());
        assert!(!backend.health_check().await);
    }
}
