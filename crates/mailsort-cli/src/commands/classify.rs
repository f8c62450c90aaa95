//! Classification commands (classify, batch, prompt)

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use mailsort_core::{score_keywords, ClassificationMethod, ClassificationResult, Department, Email};

use super::{load_classifier, truncate};

pub async fn cmd_classify(
    corpus: Option<&Path>,
    subject: String,
    body: String,
    sender: Option<String>,
    json: bool,
    explain: bool,
) -> Result<()> {
    let email = Email {
        subject,
        body,
        sender,
    };
    let classifier = load_classifier(corpus);
    let result = classifier.classify(&email).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("📬 {}", result.label);
        println!("   Confidence: {:.2}", result.confidence);
        println!("   Method:     {}", method_label(result.method));
    }

    if explain {
        let scores = score_keywords(&email.subject, &email.body);
        println!();
        println!("🔎 Keyword scores:");
        for (dept, score) in &scores.scores {
            println!("   {:<16} {}", dept.as_str(), score);
        }
    }

    Ok(())
}

/// Read a JSON array of emails
pub fn read_emails(path: &Path) -> Result<Vec<Email>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let emails: Vec<Email> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of emails", path.display()))?;
    Ok(emails)
}

pub async fn cmd_batch(
    corpus: Option<&Path>,
    file: &Path,
    parallel: Option<usize>,
    json: bool,
) -> Result<()> {
    let emails = read_emails(file)?;
    if emails.is_empty() {
        bail!("{} contains no emails", file.display());
    }

    let classifier = load_classifier(corpus);
    let parallel = parallel.unwrap_or(classifier.config().max_parallel);
    let results = classifier.batch_classify_concurrent(&emails, parallel).await;

    if json {
        let rows: Vec<_> = emails
            .iter()
            .zip(&results)
            .map(|(email, result)| {
                serde_json::json!({
                    "label": result.label,
                    "confidence": result.confidence,
                    "method": result.method,
                    "email": email,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!();
    println!(
        "  {:>3}  {:<16} {:>5}  {:<10} Subject",
        "#", "Department", "Conf", "Method"
    );
    println!("  {}", "─".repeat(72));
    for (i, (email, result)) in emails.iter().zip(&results).enumerate() {
        println!(
            "  {:>3}  {:<16} {:>5.2}  {:<10} {}",
            i + 1,
            result.label.as_str(),
            result.confidence,
            result.method.as_str(),
            truncate(&email.subject, 40)
        );
    }

    println!();
    print_summary(&results);
    Ok(())
}

fn print_summary(results: &[ClassificationResult]) {
    for dept in Department::all() {
        let count = results.iter().filter(|r| r.label == *dept).count();
        if count > 0 {
            println!("  {:<16} {}", dept.as_str(), count);
        }
    }
    let llm = results
        .iter()
        .filter(|r| r.method == ClassificationMethod::Llm)
        .count();
    println!(
        "  {} email(s), {} answered by the model, {} by keyword rules",
        results.len(),
        llm,
        results.len() - llm
    );
}

pub fn cmd_prompt(corpus: Option<&Path>, subject: String, body: String) -> Result<()> {
    let classifier = load_classifier(corpus);
    let email = Email::new(subject, body);
    println!("{}", classifier.build_prompt(&email));
    Ok(())
}

fn method_label(method: ClassificationMethod) -> &'static str {
    match method {
        ClassificationMethod::Llm => "llm (model answer)",
        ClassificationMethod::RuleBased => "rule-based (keyword fallback)",
    }
}
