//! Mailsort Core Library
//!
//! Shared functionality for the Mailsort support-email classifier:
//! - Department and email domain models
//! - Labeled example corpus (embedded default, optional JSON file)
//! - Keyword rules used when no model answer is available
//! - Few-shot prompt construction with overridable template
//! - Pluggable chat-model backends (Azure OpenAI, OpenAI-compatible servers)
//! - Evaluation metrics and a bounded classification history

pub mod ai;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod history;
pub mod metrics;
pub mod models;
pub mod prompts;
pub mod rules;

/// Test utilities including mock chat-completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    parse_department, AIClient, AzureOpenAIBackend, ChatSettings, MockBackend, MockReply,
    ModelBackend, OpenAICompatibleBackend,
};
pub use classifier::{llm_confidence, EmailClassifier, EvaluationReport};
pub use config::ClassifierConfig;
pub use corpus::Corpus;
pub use error::{Error, Result};
pub use history::{ClassificationHistory, HistoryEntry};
pub use metrics::{compute_metrics, per_class_report, ClassReport};
pub use models::{
    ClassificationMethod, ClassificationResult, Department, Email, EvaluationMetrics,
    LabeledEmail,
};
pub use prompts::{build_prompt, FewShotPromptBuilder, PromptTemplate};
pub use rules::{fallback_classify, score_keywords, KeywordScores};
