//! Mailsort CLI - Support-email classifier
//!
//! Usage:
//!   mailsort classify -s SUBJECT -b BODY   Classify one email
//!   mailsort batch --file emails.json      Classify a file of emails
//!   mailsort evaluate --detailed           Score against the labeled corpus
//!   mailsort serve --port 8000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let corpus = cli.corpus.as_deref();

    match cli.command {
        Commands::Classify {
            subject,
            body,
            sender,
            json,
            explain,
        } => commands::cmd_classify(corpus, subject, body, sender, json, explain).await,
        Commands::Batch {
            file,
            parallel,
            json,
        } => commands::cmd_batch(corpus, &file, parallel, json).await,
        Commands::Evaluate { detailed } => commands::cmd_evaluate(corpus, detailed).await,
        Commands::Departments => commands::cmd_departments(),
        Commands::Prompt { subject, body } => commands::cmd_prompt(corpus, subject, body),
        Commands::Serve {
            port,
            host,
            history_capacity,
            allowed_origins,
        } => commands::cmd_serve(corpus, &host, port, history_capacity, allowed_origins).await,
        Commands::CheckEnv => commands::cmd_check_env(),
    }
}
