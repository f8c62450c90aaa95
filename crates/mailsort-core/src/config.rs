//! Classifier configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/mailsort/config/classifier.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every key is optional; missing keys keep the built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/classifier.toml");

/// Runtime settings for the classifier and its collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Timeout for a single model request
    pub timeout: Duration,
    /// Sampling temperature sent to the model
    pub temperature: f32,
    /// Completion token cap sent to the model
    pub max_tokens: u32,
    /// Upper bound on concurrent classifications in a batch
    pub max_parallel: usize,
    /// Entries kept by the classification history
    pub history_capacity: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            temperature: 0.1,
            max_tokens: 50,
            max_parallel: 4,
            history_capacity: 1000,
        }
    }
}

impl ClassifierConfig {
    /// Load from the default override location, else the embedded default
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit file (embedded default if it does not exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse TOML content on top of the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mailsort").join("config").join("classifier.toml"))
}

fn load_config(override_path: Option<&Path>) -> Result<ClassifierConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    let content = match path {
        Some(p) if p.exists() => fs::read_to_string(&p)?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    llm: Option<RawLlm>,
    batch: Option<RawBatch>,
    history: Option<RawHistory>,
}

#[derive(Debug, Deserialize)]
struct RawLlm {
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawBatch {
    max_parallel: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawHistory {
    capacity: Option<usize>,
}

fn parse_config(content: &str) -> Result<ClassifierConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut config = ClassifierConfig::default();

    if let Some(llm) = raw.llm {
        if let Some(timeout) = llm.timeout_secs {
            config.timeout = Duration::from_secs(timeout.max(1));
        }
        if let Some(temperature) = llm.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = llm.max_tokens {
            config.max_tokens = max_tokens;
        }
    }

    if let Some(batch) = raw.batch {
        if let Some(max_parallel) = batch.max_parallel {
            config.max_parallel = max_parallel.max(1);
        }
    }

    if let Some(history) = raw.history {
        if let Some(capacity) = history.capacity {
            config.history_capacity = capacity.max(1);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, ClassifierConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = ClassifierConfig::from_toml(
            r#"
[llm]
timeout_secs = 5

[history]
capacity = 20
"#,
        )
        .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_tokens, 50);
        assert_eq!(config.max_parallel, 4);
        assert_eq!(config.history_capacity, 20);
    }

    #[test]
    fn test_zero_values_clamped() {
        let config =
            ClassifierConfig::from_toml("[batch]\nmax_parallel = 0\n[history]\ncapacity = 0\n")
                .unwrap();
        assert_eq!(config.max_parallel, 1);
        assert_eq!(config.history_capacity, 1);
    }

    #[test]
    fn test_zero_timeout_clamped() {
        let config = ClassifierConfig::from_toml("[llm]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_unreadable_override_is_io_error() {
        // Exists but is a directory
        let dir = tempfile::tempdir().unwrap();
        let err = ClassifierConfig::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ClassifierConfig::from_toml("[llm\ntimeout_secs = ").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.toml");
        fs::write(&path, "[llm]\nmax_tokens = 10\n").unwrap();

        let config = ClassifierConfig::load_from(&path).unwrap();
        assert_eq!(config.max_tokens, 10);
    }

    #[test]
    fn test_load_from_missing_file_uses_default() {
        let config = ClassifierConfig::load_from(Path::new("/nonexistent/classifier.toml")).unwrap();
        assert_eq!(config, ClassifierConfig::default());
    }
}
