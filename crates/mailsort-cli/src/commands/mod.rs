//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `classify` - Single, batch and prompt preview commands
//! - `evaluate` - Corpus evaluation and department listing
//! - `serve` - Web server command
//! - `env` - Model backend environment check

pub mod classify;
pub mod env;
pub mod evaluate;
pub mod serve;

// Re-export command functions for main.rs
pub use classify::*;
pub use env::*;
pub use evaluate::*;
pub use serve::*;

use std::path::Path;

use mailsort_core::EmailClassifier;

/// Classifier built from the environment, config overrides and the chosen corpus
pub fn load_classifier(corpus: Option<&Path>) -> EmailClassifier {
    EmailClassifier::from_env(corpus)
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
