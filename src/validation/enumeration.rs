//! Enumerated values

use super::{ValidationResult, ValueError};

/// Exact, case-sensitive membership. An empty list accepts anything.
pub fn validate_enum(value: &str, values: &[String]) -> ValidationResult {
    let value = value.trim();
    if values.is_empty() || values.iter().any(|v| v == value) {
        return ValidationResult::Valid;
    }

    ValidationResult::invalid(
        ValueError::InvalidValue,
        format!("valid values: {}", values.join(", ")),
    )
}
