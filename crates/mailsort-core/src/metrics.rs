//! Classification quality metrics
//!
//! Accuracy plus support-weighted precision, recall and F1. The class set is
//! the union of true and predicted labels; a class with no predictions or no
//! support contributes 0 instead of dividing by zero.

use serde::Serialize;

use crate::models::{Department, EvaluationMetrics};

/// Per-class precision/recall/F1 with true-label support
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassReport {
    pub label: Department,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Round to three decimals
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Unrounded report for every department that appears as a true or predicted label
///
/// `pairs` are `(expected, predicted)`. Reports come back in department order.
pub fn per_class_report(pairs: &[(Department, Department)]) -> Vec<ClassReport> {
    Department::all()
        .iter()
        .filter(|&&d| pairs.iter().any(|&(t, p)| t == d || p == d))
        .map(|&label| {
            let tp = pairs.iter().filter(|&&(t, p)| t == label && p == label).count();
            let predicted = pairs.iter().filter(|&&(_, p)| p == label).count();
            let support = pairs.iter().filter(|&&(t, _)| t == label).count();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };

            ClassReport {
                label,
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect()
}

/// Accuracy and weighted precision/recall/F1, rounded to three decimals
pub fn compute_metrics(pairs: &[(Department, Department)]) -> EvaluationMetrics {
    let total = pairs.len();
    if total == 0 {
        return EvaluationMetrics::default();
    }

    let correct = pairs.iter().filter(|(t, p)| t == p).count();
    let reports = per_class_report(pairs);

    let weighted = |f: fn(&ClassReport) -> f64| -> f64 {
        reports
            .iter()
            .map(|r| f(r) * r.support as f64)
            .sum::<f64>()
            / total as f64
    };

    EvaluationMetrics {
        accuracy: round3(ratio(correct, total)),
        precision: round3(weighted(|r| r.precision)),
        recall: round3(weighted(|r| r.recall)),
        f1_score: round3(weighted(|r| r.f1)),
        total_predictions: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Department::*;

    #[test]
    fn test_empty_input() {
        let metrics = compute_metrics(&[]);
        assert_eq!(metrics, EvaluationMetrics::default());
        assert_eq!(metrics.total_predictions, 0);
    }

    #[test]
    fn test_perfect_predictions() {
        let pairs = [(It, It), (Sales, Sales), (Accounting, Accounting)];
        let metrics = compute_metrics(&pairs);
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1_score, 1.0);
        assert_eq!(metrics.total_predictions, 3);
    }

    #[test]
    fn test_weighted_scores() {
        // IT: tp=2, predicted=3, support=2 -> p=0.667 r=1.0 f1=0.8
        // Sales: tp=1, predicted=1, support=2 -> p=1.0 r=0.5 f1=0.667
        let pairs = [(It, It), (It, It), (Sales, Sales), (Sales, It)];
        let metrics = compute_metrics(&pairs);

        assert_eq!(metrics.accuracy, 0.75);
        assert_eq!(metrics.precision, 0.833);
        assert_eq!(metrics.recall, 0.75);
        assert_eq!(metrics.f1_score, 0.733);
    }

    #[test]
    fn test_predicted_only_class_contributes_zero() {
        // CustomerService never appears as a true label
        let pairs = [(It, CustomerService), (It, It)];
        let reports = per_class_report(&pairs);

        assert_eq!(reports.len(), 2);
        let cs = reports.iter().find(|r| r.label == CustomerService).unwrap();
        assert_eq!(cs.support, 0);
        assert_eq!(cs.precision, 0.0);
        assert_eq!(cs.f1, 0.0);

        let metrics = compute_metrics(&pairs);
        assert_eq!(metrics.accuracy, 0.5);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 0.5);
        assert_eq!(metrics.f1_score, 0.667);
    }

    #[test]
    fn test_never_predicted_class() {
        let pairs = [(Sales, It), (It, It)];
        let reports = per_class_report(&pairs);
        let sales = reports.iter().find(|r| r.label == Sales).unwrap();
        assert_eq!(sales.precision, 0.0);
        assert_eq!(sales.recall, 0.0);
        assert_eq!(sales.support, 1);
    }

    #[test]
    fn test_report_order_and_bounds() {
        let pairs = [(Sales, Sales), (It, Accounting), (Accounting, Accounting)];
        let reports = per_class_report(&pairs);
        let labels: Vec<_> = reports.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![It, Accounting, Sales]);

        let metrics = compute_metrics(&pairs);
        for value in [metrics.accuracy, metrics.precision, metrics.recall, metrics.f1_score] {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(2.0 / 3.0), 0.667);
        assert_eq!(round3(0.1234), 0.123);
    }
}
