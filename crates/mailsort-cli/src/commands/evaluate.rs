//! Evaluation and department listing commands

use std::path::Path;

use anyhow::Result;
use mailsort_core::metrics::round3;
use mailsort_core::{Department, ModelBackend};

use super::load_classifier;

pub async fn cmd_evaluate(corpus: Option<&Path>, detailed: bool) -> Result<()> {
    let classifier = load_classifier(corpus);
    if classifier.corpus().is_empty() {
        println!("⚠️  Corpus is empty, nothing to evaluate");
        return Ok(());
    }

    match classifier.ai() {
        Some(ai) => println!("🧠 Evaluating with {} ({})", ai.backend_name(), ai.model()),
        None => println!("🔤 Evaluating keyword rules (no model backend configured)"),
    }

    let report = classifier.evaluate_detailed().await;
    let m = &report.metrics;

    println!();
    println!("  Emails:     {}", m.total_predictions);
    println!("  Accuracy:   {:.3}", m.accuracy);
    println!("  Precision:  {:.3}", m.precision);
    println!("  Recall:     {:.3}", m.recall);
    println!("  F1 score:   {:.3}", m.f1_score);
    if classifier.ai().is_some() {
        println!(
            "  Model answers: {}/{}",
            report.llm_answers, m.total_predictions
        );
    }

    if detailed {
        println!();
        println!(
            "  {:<16} {:>9} {:>7} {:>6} {:>8}",
            "Department", "Precision", "Recall", "F1", "Support"
        );
        println!("  {}", "─".repeat(50));
        for class in &report.classes {
            println!(
                "  {:<16} {:>9.3} {:>7.3} {:>6.3} {:>8}",
                class.label.as_str(),
                round3(class.precision),
                round3(class.recall),
                round3(class.f1),
                class.support
            );
        }
    }

    println!();
    Ok(())
}

pub fn cmd_departments() -> Result<()> {
    println!();
    for dept in Department::all() {
        println!("  {:<16} {}", dept.as_str(), dept.description());
    }
    println!();
    Ok(())
}
