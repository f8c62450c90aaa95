//! Email classification orchestrator
//!
//! Classification tries the configured model first and falls back to keyword
//! rules when there is no model, the call fails, or the answer names no
//! department. `classify` therefore never fails.

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::ai::{parse_department, AIClient, ChatSettings, ModelBackend};
use crate::config::ClassifierConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::metrics::{compute_metrics, per_class_report, ClassReport};
use crate::models::{
    ClassificationMethod, ClassificationResult, Department, Email, EvaluationMetrics,
};
use crate::prompts::{FewShotPromptBuilder, PromptTemplate};
use crate::rules::fallback_classify;

/// Lower edge of the confidence band reported for model answers
pub const LLM_CONFIDENCE_MIN: f64 = 0.85;

/// Upper edge of the confidence band reported for model answers
pub const LLM_CONFIDENCE_MAX: f64 = 0.95;

/// Evaluation output with the per-department breakdown
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub metrics: EvaluationMetrics,
    pub classes: Vec<ClassReport>,
    /// How many corpus emails were answered by the model
    pub llm_answers: usize,
}

/// Classifies support emails into departments
#[derive(Debug, Clone)]
pub struct EmailClassifier {
    corpus: Arc<Corpus>,
    ai: Option<AIClient>,
    prompts: FewShotPromptBuilder,
    config: ClassifierConfig,
}

impl EmailClassifier {
    /// Create a classifier over `corpus`, using `ai` when present
    pub fn new(corpus: Corpus, ai: Option<AIClient>) -> Self {
        Self {
            corpus: Arc::new(corpus),
            ai,
            prompts: FewShotPromptBuilder::embedded(),
            config: ClassifierConfig::default(),
        }
    }

    /// Rule-based only classifier (no model configured)
    pub fn rules_only(corpus: Corpus) -> Self {
        Self::new(corpus, None)
    }

    /// Build everything from the environment and default locations
    ///
    /// Config, prompt and corpus problems are logged and replaced by the
    /// built-in defaults; a missing model configuration means rules only.
    pub fn from_env(corpus_path: Option<&Path>) -> Self {
        let config = ClassifierConfig::load().unwrap_or_else(|e| {
            warn!("Failed to load classifier config, using defaults: {}", e);
            ClassifierConfig::default()
        });

        let template = PromptTemplate::load().unwrap_or_else(|e| {
            warn!("Failed to load prompt override, using embedded prompt: {}", e);
            PromptTemplate::embedded()
        });
        if template.is_override {
            info!(
                path = ?template.override_path,
                version = template.metadata.version,
                "Using prompt override"
            );
        }

        let corpus = Corpus::load_or_empty(corpus_path);
        let ai = AIClient::from_env();

        Self::new(corpus, ai)
            .with_config(config)
            .with_prompt_builder(FewShotPromptBuilder::new(template))
    }

    /// Apply config; the model client picks up the timeout and generation settings
    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.ai = self
            .ai
            .map(|ai| ai.with_settings(ChatSettings::from(&config)));
        self.config = config;
        self
    }

    pub fn with_prompt_builder(mut self, prompts: FewShotPromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn ai(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn departments(&self) -> &'static [Department] {
        Department::all()
    }

    /// The user prompt that would be sent to the model for `email`
    pub fn build_prompt(&self, email: &Email) -> String {
        self.prompts.build(email, &self.corpus, Department::all())
    }

    /// Classify one email
    pub async fn classify(&self, email: &Email) -> ClassificationResult {
        let Some(ai) = &self.ai else {
            debug!("No model backend configured, using keyword rules");
            return fallback_classify(&email.subject, &email.body);
        };

        match self.classify_with_model(ai, email).await {
            Ok(result) => result,
            Err(e) if e.is_transport() => {
                warn!(
                    backend = ai.backend_name(),
                    "Model call failed, using keyword rules: {}", e
                );
                fallback_classify(&email.subject, &email.body)
            }
            Err(e) => {
                warn!("Unusable model answer, using keyword rules: {}", e);
                fallback_classify(&email.subject, &email.body)
            }
        }
    }

    async fn classify_with_model(
        &self,
        ai: &AIClient,
        email: &Email,
    ) -> Result<ClassificationResult> {
        let prompt = self.build_prompt(email);
        let raw = ai
            .classify_via_model(self.prompts.system_prompt(), &prompt)
            .await?;
        debug!(model = ai.model(), raw = %raw.trim(), "Model answer");

        let label = parse_department(&raw)?;
        Ok(ClassificationResult {
            label,
            confidence: llm_confidence(&prompt, label),
            method: ClassificationMethod::Llm,
        })
    }

    /// Classify emails one after another; one result per input, in order
    pub async fn batch_classify(&self, emails: &[Email]) -> Vec<ClassificationResult> {
        let mut results = Vec::with_capacity(emails.len());
        for email in emails {
            results.push(self.classify(email).await);
        }
        results
    }

    /// Classify with at most `max_parallel` model calls in flight; results keep input order
    pub async fn batch_classify_concurrent(
        &self,
        emails: &[Email],
        max_parallel: usize,
    ) -> Vec<ClassificationResult> {
        let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));

        let tasks = emails.iter().map(|email| {
            let semaphore = semaphore.clone();
            async move {
                // The semaphore is never closed; a missing permit only lifts the bound
                let _permit = semaphore.acquire().await.ok();
                self.classify(email).await
            }
        });

        join_all(tasks).await
    }

    /// Classify every corpus email and score against its label
    pub async fn evaluate(&self) -> EvaluationMetrics {
        self.evaluate_detailed().await.metrics
    }

    /// Like `evaluate`, with per-department scores
    pub async fn evaluate_detailed(&self) -> EvaluationReport {
        let emails: Vec<Email> = self.corpus.iter().map(|e| e.to_email()).collect();
        let results = self
            .batch_classify_concurrent(&emails, self.config.max_parallel)
            .await;

        let pairs: Vec<(Department, Department)> = self
            .corpus
            .iter()
            .zip(&results)
            .map(|(example, result)| (example.label, result.label))
            .collect();
        let llm_answers = results
            .iter()
            .filter(|r| r.method == ClassificationMethod::Llm)
            .count();

        let metrics = compute_metrics(&pairs);
        info!(
            total = metrics.total_predictions,
            accuracy = metrics.accuracy,
            f1 = metrics.f1_score,
            llm_answers,
            "Evaluation finished"
        );

        EvaluationReport {
            metrics,
            classes: per_class_report(&pairs),
            llm_answers,
        }
    }
}

/// Confidence reported for a model answer
///
/// Models give no usable probability here, so this is a fixed band in
/// [0.85, 0.95] with two decimals, picked from a hash of prompt and label so
/// repeated runs agree.
pub fn llm_confidence(prompt: &str, label: Department) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hasher.update(label.as_str().as_bytes());
    let digest = hasher.finalize();

    // Hundredths in 85..=95
    let hundredths = 85 + u32::from(digest[0]) % 11;
    f64::from(hundredths) / 100.0
}
