//! Training corpus of hand-labeled support emails
//!
//! The corpus feeds both the few-shot prompt and the evaluation harness.
//! It is loaded with a two-layer resolution:
//! 1. An explicit path (CLI `--corpus` or `MAILSORT_CORPUS`)
//! 2. The embedded default (compiled into the binary)
//!
//! Load failures never abort the classifier: callers that use
//! [`Corpus::load_or_empty`] get an empty corpus and an error log line.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{error, warn};

use crate::error::{Error, Result};
use crate::models::{Department, LabeledEmail};

/// Embedded default corpus (compiled into binary)
const DEFAULT_CORPUS: &str = include_str!("../../../data/training_emails.json");

/// Environment variable pointing at a corpus file
pub const CORPUS_ENV_VAR: &str = "MAILSORT_CORPUS";

/// Ordered, read-only set of labeled examples
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    examples: Vec<LabeledEmail>,
}

impl Corpus {
    pub fn new(examples: Vec<LabeledEmail>) -> Self {
        Self { examples }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the embedded default corpus
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_CORPUS)
    }

    /// Parse a corpus from a JSON array of labeled emails
    pub fn from_json(json: &str) -> Result<Self> {
        let examples: Vec<LabeledEmail> = serde_json::from_str(json)
            .map_err(|e| Error::CorpusLoad(format!("malformed corpus: {}", e)))?;
        let corpus = Self { examples };
        corpus.warn_missing_departments();
        Ok(corpus)
    }

    /// Read a corpus file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::CorpusLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Load from `path` (or `MAILSORT_CORPUS`, or the embedded default),
    /// degrading to an empty corpus on any failure
    pub fn load_or_empty(path: Option<&Path>) -> Self {
        let env_path = std::env::var(CORPUS_ENV_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty());

        let result = match (path, env_path) {
            (Some(p), _) => Self::from_path(p),
            (None, Some(p)) => Self::from_path(Path::new(&p)),
            (None, None) => Self::embedded(),
        };

        match result {
            Ok(corpus) => corpus,
            Err(e) => {
                error!("Error loading training data: {}", e);
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledEmail> {
        self.examples.iter()
    }

    pub fn examples(&self) -> &[LabeledEmail] {
        &self.examples
    }

    /// First `limit` examples carrying `label`, in corpus order
    pub fn examples_for(
        &self,
        label: Department,
        limit: usize,
    ) -> impl Iterator<Item = &LabeledEmail> {
        self.examples
            .iter()
            .filter(move |e| e.label == label)
            .take(limit)
    }

    /// Distinct labels present in the corpus, sorted by name
    pub fn labels(&self) -> Vec<Department> {
        let mut labels: Vec<Department> = Vec::new();
        for example in &self.examples {
            if !labels.contains(&example.label) {
                labels.push(example.label);
            }
        }
        labels.sort_by_key(|d| d.as_str());
        labels
    }

    /// Number of examples per department
    pub fn label_counts(&self) -> HashMap<Department, usize> {
        let mut counts = HashMap::new();
        for example in &self.examples {
            *counts.entry(example.label).or_insert(0) += 1;
        }
        counts
    }

    fn warn_missing_departments(&self) {
        let counts = self.label_counts();
        for dept in Department::all() {
            if !counts.contains_key(dept) {
                warn!(department = %dept, "Corpus has no examples for department");
            }
        }
    }
}
