//! Boolean values

use super::{ValidationResult, ValueError};

const BOOLEAN_WORDS: [&str; 4] = ["true", "false", "yes", "no"];

pub fn validate_boolean(value: &str) -> ValidationResult {
    let value = value.trim();
    if BOOLEAN_WORDS.iter().any(|w| w.eq_ignore_ascii_case(value)) {
        return ValidationResult::Valid;
    }

    ValidationResult::invalid(
        ValueError::InvalidBoolean,
        format!("use one of: {}", BOOLEAN_WORDS.join(", ")),
    )
}
