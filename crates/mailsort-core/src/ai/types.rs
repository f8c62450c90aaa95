//! Chat-completions wire types and request settings
//!
//! Azure OpenAI and OpenAI-compatible servers share the same request and
//! response bodies; only the URL and auth header differ.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};

/// Generation and transport settings applied to every model request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatSettings {
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from(&ClassifierConfig::default())
    }
}

impl From<&ClassifierConfig> for ChatSettings {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            timeout: config.timeout,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl ChatSettings {
    /// HTTP client with the request timeout applied
    pub(crate) fn http_client(&self) -> Client {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build HTTP client with timeout, using defaults");
                Client::new()
            })
    }

    /// Request body with an optional system message followed by the user prompt
    pub(crate) fn request(
        &self,
        model: Option<&str>,
        system: Option<&str>,
        prompt: &str,
    ) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatCompletionRequest {
            model: model.map(str::to_string),
            messages,
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            stream: false,
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    /// Omitted for Azure, where the deployment in the URL selects the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    /// Null when the provider filtered the completion
    #[serde(default)]
    pub content: Option<String>,
}

/// Send a prepared request and extract the first choice's text
///
/// Network failures, timeouts, non-2xx statuses and bodies that are not a
/// chat completion all surface as transport errors.
pub(crate) async fn send_chat(request: RequestBuilder, provider: &str) -> Result<String> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Transport(format!(
            "{} API error {}: {}",
            provider,
            status,
            truncate(&body, 200)
        )));
    }

    let chat_response: ChatCompletionResponse = response.json().await?;

    chat_response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| Error::Transport(format!("No response from {} API", provider)))
}

/// Truncate on a char boundary for log and error messages
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_with_system_message() {
        let settings = ChatSettings::default();
        let request = settings.request(None, Some("sys"), "hello");
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("model").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 50);
        assert!((json["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_request_without_system_message() {
        let request = ChatSettings::default().request(Some("llama3.2"), None, "hi");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.model.as_deref(), Some("llama3.2"));
    }

    #[test]
    fn test_response_with_null_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("zażółć", 3), "zaż...");
    }
}
