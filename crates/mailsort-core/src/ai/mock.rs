//! Mock backend for testing
//!
//! Deterministic stand-in for a chat model. Useful for unit tests and
//! development without a model endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::rules;

use super::ModelBackend;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Always return this text
    Fixed(String),
    /// Always fail with a transport error
    Fail,
    /// Name the department whose keywords best match the email in the prompt
    KeywordEcho,
}

/// Mock AI backend for testing
#[derive(Debug, Clone)]
pub struct MockBackend {
    reply: MockReply,
    delay: Option<Duration>,
    /// Whether health_check should return true
    pub healthy: bool,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend that echoes keyword matches (healthy by default)
    pub fn new() -> Self {
        Self {
            reply: MockReply::KeywordEcho,
            delay: None,
            healthy: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mock that always answers `reply`
    pub fn fixed(reply: &str) -> Self {
        Self {
            reply: MockReply::Fixed(reply.to_string()),
            ..Self::new()
        }
    }

    /// Mock whose every call fails like an unreachable endpoint
    pub fn failing() -> Self {
        Self {
            reply: MockReply::Fail,
            healthy: false,
            ..Self::new()
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of model calls made through this mock and its clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// The part of the prompt after the last `Temat:` line (the email being classified)
fn target_email(prompt: &str) -> &str {
    prompt
        .rfind("Temat:")
        .map(|idx| &prompt[idx..])
        .unwrap_or(prompt)
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn classify_via_model(&self, _system: Option<&str>, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            MockReply::Fixed(reply) => Ok(reply.clone()),
            MockReply::Fail => Err(Error::Transport("mock backend failure".into())),
            MockReply::KeywordEcho => {
                let label = rules::fallback_classify(target_email(prompt), "").label;
                Ok(label.to_string())
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
