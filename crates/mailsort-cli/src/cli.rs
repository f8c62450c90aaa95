//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mailsort - Route support emails to the right department
#[derive(Parser)]
#[command(name = "mailsort")]
#[command(about = "Support-email classifier with LLM and keyword fallback", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Training corpus JSON (defaults to $MAILSORT_CORPUS, then the built-in corpus)
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a single email
    Classify {
        /// Email subject
        #[arg(short, long)]
        subject: String,

        /// Email body
        #[arg(short, long)]
        body: String,

        /// Sender address
        #[arg(long)]
        sender: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Show per-department keyword scores
        #[arg(long)]
        explain: bool,
    },

    /// Classify every email in a JSON file
    Batch {
        /// JSON array of {subject, body, sender?}
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum concurrent model calls (defaults to the configured value)
        #[arg(short, long)]
        parallel: Option<usize>,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score the classifier against the labeled corpus
    Evaluate {
        /// Show per-department precision, recall and F1
        #[arg(short, long)]
        detailed: bool,
    },

    /// List the departments
    Departments,

    /// Print the few-shot prompt that would be sent for an email
    Prompt {
        /// Email subject
        #[arg(short, long)]
        subject: String,

        /// Email body
        #[arg(short, long)]
        body: String,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Classification history entries to keep (defaults to the configured value)
        #[arg(long)]
        history_capacity: Option<usize>,

        /// Allowed CORS origin (repeatable; any origin when omitted)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },

    /// Show which model backend settings are present
    CheckEnv,
}
