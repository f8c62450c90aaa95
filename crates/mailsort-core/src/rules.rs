//! Rule-based fallback classifier
//!
//! Keyword-frequency scoring over the lowercased subject and body. Used when
//! no model endpoint is configured or the model call fails, so it must stay
//! pure, total and deterministic.

use serde::Serialize;

use crate::models::{ClassificationMethod, ClassificationResult, Department};

/// Confidence reported when no keyword matched at all
pub const NO_MATCH_CONFIDENCE: f64 = 0.3;

/// Upper bound on rule-based confidence
pub const MAX_RULE_CONFIDENCE: f64 = 0.95;

const IT_KEYWORDS: &[&str] = &[
    "błąd",
    "awaria",
    "serwer",
    "system",
    "logowanie",
    "hasło",
    "vpn",
    "drukarka",
    "baza danych",
    "error",
    "nie działa",
];

const ACCOUNTING_KEYWORDS: &[&str] = &[
    "faktura",
    "płatność",
    "vat",
    "księgowy",
    "przelew",
    "rozliczenie",
    "podatek",
    "kwota",
];

const CUSTOMER_SERVICE_KEYWORDS: &[&str] = &[
    "reklamacja",
    "zwrot",
    "zamówienie",
    "dostawa",
    "anulacja",
    "subskrypcja",
    "paczka",
    "produkt",
];

const SALES_KEYWORDS: &[&str] = &[
    "oferta",
    "współpraca",
    "propozycja",
    "cennik",
    "demo",
    "prezentacja",
    "biznes",
    "partner",
];

/// Keywords representative of a department
pub fn keywords_for(department: Department) -> &'static [&'static str] {
    match department {
        Department::It => IT_KEYWORDS,
        Department::Accounting => ACCOUNTING_KEYWORDS,
        Department::CustomerService => CUSTOMER_SERVICE_KEYWORDS,
        Department::Sales => SALES_KEYWORDS,
    }
}

/// Per-department keyword hit counts for one email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordScores {
    /// Scores in department order
    pub scores: Vec<(Department, usize)>,
}

impl KeywordScores {
    pub fn total(&self) -> usize {
        self.scores.iter().map(|(_, s)| s).sum()
    }

    pub fn score(&self, department: Department) -> usize {
        self.scores
            .iter()
            .find(|(d, _)| *d == department)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    /// Department with the strictly highest score; earlier departments win ties.
    /// `None` when nothing matched.
    pub fn winner(&self) -> Option<(Department, usize)> {
        let mut best: Option<(Department, usize)> = None;
        for &(dept, score) in &self.scores {
            if score == 0 {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((dept, score)),
            }
        }
        best
    }
}

/// Count keyword hits per department (substring containment, each keyword at most once)
pub fn score_keywords(subject: &str, body: &str) -> KeywordScores {
    let text = format!("{} {}", subject, body).to_lowercase();

    let scores = Department::all()
        .iter()
        .map(|&dept| {
            let hits = keywords_for(dept)
                .iter()
                .filter(|keyword| text.contains(*keyword))
                .count();
            (dept, hits)
        })
        .collect();

    KeywordScores { scores }
}

/// Classify an email using keyword frequencies only
pub fn fallback_classify(subject: &str, body: &str) -> ClassificationResult {
    let scores = score_keywords(subject, body);

    let (label, confidence) = match scores.winner() {
        Some((dept, score)) => {
            let confidence = score as f64 / scores.total().max(1) as f64;
            (dept, confidence.min(MAX_RULE_CONFIDENCE))
        }
        None => (Department::default_fallback(), NO_MATCH_CONFIDENCE),
    };

    ClassificationResult {
        label,
        confidence,
        method: ClassificationMethod::RuleBased,
    }
}
