//! Free text with length and pattern constraints

use super::{ValidationResult, ValueError};
use regex::Regex;

/// Text grammar. A pattern that failed to compile is already `None`.
#[derive(Debug, Clone, Default)]
pub struct TextSpec {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
}

pub fn validate_text(value: &str, spec: &TextSpec) -> ValidationResult {
    let length = value.chars().count();

    if let Some(min) = spec.min_length.filter(|min| length < *min) {
        return ValidationResult::invalid(
            ValueError::TooShort,
            format!("use at least {} characters ({} now)", min, length),
        );
    }

    if let Some(max) = spec.max_length.filter(|max| length > *max) {
        return ValidationResult::invalid(
            ValueError::TooLong,
            format!("use at most {} characters ({} now)", max, length),
        );
    }

    if let Some(pattern) = &spec.pattern {
        if !pattern.is_match(value) {
            return ValidationResult::invalid(
                ValueError::PatternMismatch,
                format!("value must match {}", pattern.as_str()),
            );
        }
    }

    ValidationResult::Valid
}
