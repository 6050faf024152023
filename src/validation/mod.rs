//! Value validation
//!
//! A field's value grammar comes from one of two places: a typed option on
//! the rule whose key matches the field (option level), or the rule's
//! legacy `value` configuration (rule level). Both are lowered into a
//! [`ValueSpec`] and validated by the pure per-type functions in the
//! submodules. Failures are data, never errors.

mod boolean;
mod enumeration;
mod number;
mod text;

pub use boolean::validate_boolean;
pub use enumeration::validate_enum;
pub use number::{validate_number, NumberSpec};
pub use text::{validate_text, TextSpec};

use crate::options::OptionType;
use crate::rules::{Rule, UnitBehavior, ValueConfig, ValueKind};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Why a value was rejected. `Display` is the short label shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueError {
    #[error("required")]
    Required,
    #[error("invalid number")]
    InvalidNumber,
    #[error("unit required")]
    UnitRequired,
    #[error("invalid unit")]
    InvalidUnit,
    #[error("no unit expected")]
    NoUnitExpected,
    #[error("out of range")]
    OutOfRange,
    #[error("decimals not allowed")]
    DecimalNotAllowed,
    #[error("invalid boolean")]
    InvalidBoolean,
    #[error("invalid value")]
    InvalidValue,
    #[error("too short")]
    TooShort,
    #[error("too long")]
    TooLong,
    #[error("pattern mismatch")]
    PatternMismatch,
}

/// Outcome of validating one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResult {
    Valid,
    Invalid {
        error: ValueError,
        suggestion: String,
    },
    /// No grammar applies to this value
    Unchecked,
}

impl ValidationResult {
    pub fn invalid(error: ValueError, suggestion: impl Into<String>) -> Self {
        ValidationResult::Invalid {
            error,
            suggestion: suggestion.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationResult::Invalid { .. })
    }

    pub fn error(&self) -> Option<ValueError> {
        match self {
            ValidationResult::Invalid { error, .. } => Some(*error),
            _ => None,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ValidationResult::Invalid { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }
}

/// Value grammar, one variant per type
#[derive(Debug, Clone)]
pub enum ValueType {
    Number(NumberSpec),
    Boolean,
    Enum(Vec<String>),
    Text(TextSpec),
    None,
}

/// Resolved grammar for a field's value
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub required: bool,
    pub value_type: ValueType,
}

impl ValueSpec {
    /// Grammar from an option-level type declaration
    pub fn from_option(option_type: &OptionType) -> Self {
        let value_type = match option_type {
            OptionType::Number { units } => ValueType::Number(NumberSpec {
                units: units.clone(),
                unit_behavior: UnitBehavior::Required,
                ..NumberSpec::default()
            }),
            OptionType::Boolean => ValueType::Boolean,
            OptionType::Enum { values } => ValueType::Enum(values.clone()),
        };

        Self {
            required: false,
            value_type,
        }
    }

    /// Grammar from a legacy rule-level configuration.
    ///
    /// A pattern that fails to compile is dropped with a warning.
    pub fn from_config(config: &ValueConfig) -> Self {
        let value_type = match config.kind {
            ValueKind::Number => ValueType::Number(NumberSpec {
                units: config.units.clone(),
                unit_behavior: config.unit_behavior,
                min: config.min,
                max: config.max,
                allow_decimals: config.allow_decimals,
            }),
            ValueKind::Boolean => ValueType::Boolean,
            ValueKind::Enum => ValueType::Enum(config.values.clone()),
            ValueKind::Text => ValueType::Text(TextSpec {
                min_length: config.min_length,
                max_length: config.max_length,
                pattern: config.pattern.as_deref().and_then(compile_pattern),
            }),
            ValueKind::None => ValueType::None,
        };

        Self {
            required: config.required,
            value_type,
        }
    }

    /// Grammar governing the field `key` under `rule`.
    ///
    /// A typed option with a matching key wins over the rule's legacy
    /// configuration. `None` means the value is not validated.
    pub fn for_field(rule: &Rule, key: &str) -> Option<Self> {
        if let Some(option_type) = rule.option(key).and_then(|o| o.value_type.as_ref()) {
            return Some(Self::from_option(option_type));
        }
        rule.value.as_ref().map(Self::from_config)
    }

    /// An example of a valid value, used in suggestions
    pub fn example(&self) -> String {
        match &self.value_type {
            ValueType::Number(spec) => spec.example("10"),
            ValueType::Boolean => "true".to_string(),
            ValueType::Enum(values) => values
                .first()
                .cloned()
                .unwrap_or_else(|| "value".to_string()),
            ValueType::Text(_) | ValueType::None => "text".to_string(),
        }
    }
}

fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Ignoring invalid value pattern '{}': {}", pattern, e);
            None
        }
    }
}

/// Validate a raw value against a grammar
pub fn validate(raw: &str, spec: &ValueSpec) -> ValidationResult {
    let value = unquote(raw.trim());

    if value.is_empty() {
        if spec.required {
            return ValidationResult::invalid(
                ValueError::Required,
                format!("enter a value, e.g. {}", spec.example()),
            );
        }
        return ValidationResult::Valid;
    }

    match &spec.value_type {
        ValueType::Number(number) => validate_number(value, number),
        ValueType::Boolean => validate_boolean(value),
        ValueType::Enum(values) => validate_enum(value, values),
        ValueType::Text(text) => validate_text(value, text),
        ValueType::None => ValidationResult::Valid,
    }
}

/// Validate when a grammar may be absent
pub fn validate_optional(raw: &str, spec: Option<&ValueSpec>) -> ValidationResult {
    match spec {
        Some(spec) => validate(raw, spec),
        None => ValidationResult::Unchecked,
    }
}

/// Strip one pair of matching YAML quotes
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
