//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use mailsort_server::ServerConfig;

use super::load_classifier;

pub async fn cmd_serve(
    corpus: Option<&Path>,
    host: &str,
    port: u16,
    history_capacity: Option<usize>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    let classifier = load_classifier(corpus);
    let history_capacity = history_capacity.unwrap_or(classifier.config().history_capacity);

    println!("🚀 Starting Mailsort web server...");
    println!("   Corpus: {} example(s)", classifier.corpus().len());
    println!("   Listening: http://{}:{}", host, port);
    println!("   History: last {} classification(s)", history_capacity);
    if allowed_origins.is_empty() {
        println!("   CORS: any origin");
    } else {
        println!("   CORS: {}", allowed_origins.join(", "));
    }
    println!();

    let config = ServerConfig {
        allowed_origins,
        history_capacity,
    };

    mailsort_server::serve_with_config(classifier, host, port, config)
        .await
        .context("Server failed")
}
