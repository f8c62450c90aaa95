//! Validation of raw model answers
//!
//! Models are asked to answer with a department name only, but often add
//! punctuation, a prefix like "Dział:" or change the case.

use crate::error::{Error, Result};
use crate::models::Department;

use super::types::truncate;

/// Map a raw model answer onto a department
///
/// Exact match on the trimmed text first, then a case-insensitive substring
/// match against each department name in department order.
pub fn parse_department(response: &str) -> Result<Department> {
    let response = response.trim();

    if let Some(dept) = Department::all().iter().find(|d| d.as_str() == response) {
        return Ok(*dept);
    }

    let lowered = response.to_lowercase();
    Department::all()
        .iter()
        .find(|d| lowered.contains(&d.as_str().to_lowercase()))
        .copied()
        .ok_or_else(|| {
            Error::InvalidModelOutput(format!(
                "No department in model answer | Raw: {}",
                truncate(response, 200)
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(parse_department("Księgowość").unwrap(), Department::Accounting);
        assert_eq!(parse_department("IT").unwrap(), Department::It);
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(parse_department("  IT \n").unwrap(), Department::It);
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(parse_department("sprzedaż.").unwrap(), Department::Sales);
        assert_eq!(
            parse_department("Dział: OBSŁUGA KLIENTA").unwrap(),
            Department::CustomerService
        );
    }

    #[test]
    fn test_first_department_in_order_wins() {
        // Mentions both; IT comes first in department order
        assert_eq!(
            parse_department("Sprzedaż albo IT").unwrap(),
            Department::It
        );
    }

    #[test]
    fn test_unmatched_answer() {
        let err = parse_department("Marketing").unwrap_err();
        assert!(matches!(err, Error::InvalidModelOutput(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_empty_answer() {
        assert!(parse_department("   ").is_err());
    }
}
