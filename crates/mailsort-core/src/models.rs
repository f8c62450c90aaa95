//! Domain models for Mailsort

use serde::{Deserialize, Serialize};

/// Department a support email can be routed to
///
/// The set is closed and ordered; the order is the tie-break order for the
/// rule-based classifier and the match order when repairing model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "Księgowość")]
    Accounting,
    #[serde(rename = "Obsługa Klienta")]
    CustomerService,
    #[serde(rename = "Sprzedaż")]
    Sales,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::It => "IT",
            Self::Accounting => "Księgowość",
            Self::CustomerService => "Obsługa Klienta",
            Self::Sales => "Sprzedaż",
        }
    }

    /// All departments in canonical order
    pub fn all() -> &'static [Department] {
        &[
            Self::It,
            Self::Accounting,
            Self::CustomerService,
            Self::Sales,
        ]
    }

    /// Natural-language description used in the few-shot prompt
    pub fn description(&self) -> &'static str {
        match self {
            Self::It => "problemy techniczne, błędy systemów, awarie, dostęp do sieci",
            Self::Accounting => "faktury, płatności, rozliczenia, podatki",
            Self::CustomerService => "reklamacje, pytania o zamówienia, zwroty, anulacje",
            Self::Sales => "nowe zapytania ofertowe, współpraca biznesowa, oferty",
        }
    }

    /// Department used when nothing else can be decided
    pub fn default_fallback() -> Self {
        Self::CustomerService
    }
}

impl std::str::FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Department::all()
            .iter()
            .copied()
            .find(|d| d.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown department: {}", s))
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An incoming support email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub subject: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl Email {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// A hand-labeled example from the training corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledEmail {
    pub email_id: String,
    pub subject: String,
    pub body: String,
    pub label: Department,
    #[serde(default)]
    pub sender: Option<String>,
}

impl LabeledEmail {
    /// The example viewed as an unlabeled input email
    pub fn to_email(&self) -> Email {
        Email {
            subject: self.subject.clone(),
            body: self.body.clone(),
            sender: self.sender.clone(),
        }
    }
}

/// How a classification was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationMethod {
    /// Answered by the language model
    #[serde(rename = "llm")]
    Llm,
    /// Keyword-frequency fallback
    #[serde(rename = "rule-based")]
    RuleBased,
}

impl ClassificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::RuleBased => "rule-based",
        }
    }
}

impl std::fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying one email
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Department,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub method: ClassificationMethod,
}

/// Aggregate quality metrics of the classifier over a labeled set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub f1_score: f64,
    pub precision: f64,
    pub recall: f64,
    pub total_predictions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_order() {
        let all = Department::all();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], Department::It);
        assert_eq!(all[3], Department::Sales);
    }

    #[test]
    fn test_department_serde_uses_display_names() {
        let json = serde_json::to_string(&Department::Accounting).unwrap();
        assert_eq!(json, r#""Księgowość""#);

        let parsed: Department = serde_json::from_str(r#""Obsługa Klienta""#).unwrap();
        assert_eq!(parsed, Department::CustomerService);

        assert!(serde_json::from_str::<Department>(r#""Marketing""#).is_err());
    }

    #[test]
    fn test_department_from_str() {
        assert_eq!("IT".parse::<Department>().unwrap(), Department::It);
        assert_eq!(" Sprzedaż ".parse::<Department>().unwrap(), Department::Sales);
        assert!("sprzedaz".parse::<Department>().is_err());
    }

    #[test]
    fn test_method_serde() {
        let json = serde_json::to_string(&ClassificationMethod::RuleBased).unwrap();
        assert_eq!(json, r#""rule-based""#);
        let parsed: ClassificationMethod = serde_json::from_str(r#""llm""#).unwrap();
        assert_eq!(parsed, ClassificationMethod::Llm);
    }

    #[test]
    fn test_email_sender_optional() {
        let email: Email = serde_json::from_str(r#"{"subject": "a", "body": "b"}"#).unwrap();
        assert!(email.sender.is_none());

        let json = serde_json::to_value(Email::new("a", "b")).unwrap();
        assert!(json.get("sender").is_none());
    }

    #[test]
    fn test_labeled_email_rejects_unknown_label() {
        let json = r#"{"email_id": "1", "subject": "s", "body": "b", "label": "HR", "sender": null}"#;
        assert!(serde_json::from_str::<LabeledEmail>(json).is_err());
    }
}
