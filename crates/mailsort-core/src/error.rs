//! Error types for Mailsort

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM backend not configured: {0}")]
    ConfigurationMissing(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM transport error: {0}")]
    Transport(String),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("Corpus load error: {0}")]
    CorpusLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Whether the error came from talking to the model endpoint
    /// (network, auth, timeout, non-2xx status, malformed body)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
