//! Numbers with an optional unit suffix

use super::{ValidationResult, ValueError};
use crate::rules::UnitBehavior;
use regex::Regex;
use std::sync::LazyLock;

/// Signed decimal numeral followed by free-text unit
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))\s*(.*)$").unwrap()
});

/// Number grammar
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSpec {
    pub units: Vec<String>,
    pub unit_behavior: UnitBehavior,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allow_decimals: bool,
}

impl Default for NumberSpec {
    fn default() -> Self {
        Self {
            units: Vec::new(),
            unit_behavior: UnitBehavior::Required,
            min: None,
            max: None,
            allow_decimals: true,
        }
    }
}

impl NumberSpec {
    /// `numeral` with the first declared unit appended
    pub fn example(&self, numeral: &str) -> String {
        match self.units.first() {
            Some(unit) if self.unit_behavior != UnitBehavior::Forbidden => {
                format!("{}{}", numeral, unit)
            }
            _ => numeral.to_string(),
        }
    }

    fn unit_list(&self) -> String {
        self.units.join(", ")
    }

    fn range_hint(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("enter a value between {} and {}", min, max),
            (Some(min), None) => format!("enter a value of at least {}", min),
            (None, Some(max)) => format!("enter a value of at most {}", max),
            (None, None) => String::new(),
        }
    }
}

pub fn validate_number(value: &str, spec: &NumberSpec) -> ValidationResult {
    let Some(caps) = NUMBER_REGEX.captures(value.trim()) else {
        return ValidationResult::invalid(
            ValueError::InvalidNumber,
            format!("enter a number, e.g. {}", spec.example("10")),
        );
    };

    let numeral = &caps[1];
    let unit = caps[2].trim();

    let Ok(number) = numeral.parse::<f64>() else {
        return ValidationResult::invalid(
            ValueError::InvalidNumber,
            format!("enter a number, e.g. {}", spec.example("10")),
        );
    };

    if unit.is_empty() {
        if !spec.units.is_empty() && spec.unit_behavior == UnitBehavior::Required {
            return ValidationResult::invalid(
                ValueError::UnitRequired,
                format!(
                    "add a unit, e.g. {} (valid units: {})",
                    spec.example(numeral),
                    spec.unit_list()
                ),
            );
        }
    } else if spec.units.is_empty() || spec.unit_behavior == UnitBehavior::Forbidden {
        return ValidationResult::invalid(
            ValueError::NoUnitExpected,
            format!("remove the unit: {}", numeral),
        );
    } else if !spec.units.iter().any(|u| u == unit) {
        return ValidationResult::invalid(
            ValueError::InvalidUnit,
            format!("valid units: {}", spec.unit_list()),
        );
    }

    let below = spec.min.is_some_and(|min| number < min);
    let above = spec.max.is_some_and(|max| number > max);
    if below || above {
        return ValidationResult::invalid(ValueError::OutOfRange, spec.range_hint());
    }

    if !spec.allow_decimals && number.fract() != 0.0 {
        return ValidationResult::invalid(
            ValueError::DecimalNotAllowed,
            format!("use a whole number, e.g. {}{}", number.round(), unit),
        );
    }

    ValidationResult::Valid
}
