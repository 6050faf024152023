//! Rule model and rule matching
//!
//! A rule binds a declared field path (e.g. `Exercises` or `Body.weight`)
//! to a set of candidate child keys and, optionally, a value grammar.
//! Rules are matched in configured order: an exact path match beats any
//! descendant match, and among equals the first declared rule wins.

use crate::options::RuleOption;
use serde::{Deserialize, Serialize};

/// Where a rule's candidates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Inline,
    Tags,
    Files,
    Date,
    Recent,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Inline => "inline",
            SourceType::Tags => "tags",
            SourceType::Files => "files",
            SourceType::Date => "date",
            SourceType::Recent => "recent",
        }
    }
}

/// Which parts of an option appear in the suggestion list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFlags {
    pub show_icon: bool,
    pub show_key: bool,
    pub show_description: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            show_icon: true,
            show_key: true,
            show_description: true,
        }
    }
}

/// Declared kind of a legacy rule-level value configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Number,
    Boolean,
    Enum,
    #[default]
    None,
}

/// How a number value treats its unit suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitBehavior {
    /// A declared unit must be present
    #[default]
    Required,
    /// A bare number is accepted
    Optional,
    /// No unit may be present
    Forbidden,
}

/// Legacy rule-level value configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueConfig {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub required: bool,
    pub units: Vec<String>,
    pub unit_behavior: UnitBehavior,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allow_decimals: bool,
    pub values: Vec<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            kind: ValueKind::None,
            required: false,
            units: Vec::new(),
            unit_behavior: UnitBehavior::Required,
            min: None,
            max: None,
            allow_decimals: true,
            values: Vec::new(),
            min_length: None,
            max_length: None,
            pattern: None,
        }
    }
}

/// A configured autocomplete/validation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default = "new_rule_id")]
    pub id: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Parent key path (may itself be dotted)
    pub field: String,

    /// Optional child key appended to `field`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<String>,

    #[serde(default)]
    pub source: SourceType,

    #[serde(default)]
    pub options: Vec<RuleOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueConfig>,

    #[serde(default)]
    pub display: DisplayFlags,

    #[serde(default)]
    pub multi_select: bool,
}

fn new_rule_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

impl Rule {
    /// Create an enabled inline rule for a field path
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            id: new_rule_id(),
            enabled: true,
            field: field.into(),
            child: None,
            source: SourceType::Inline,
            options: Vec::new(),
            value: None,
            display: DisplayFlags::default(),
            multi_select: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.child = Some(child.into());
        self
    }

    pub fn with_source(mut self, source: SourceType) -> Self {
        self.source = source;
        self
    }

    pub fn with_options(mut self, options: Vec<RuleOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_value(mut self, value: ValueConfig) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_display(mut self, display: DisplayFlags) -> Self {
        self.display = display;
        self
    }

    pub fn multi_select(mut self, multi: bool) -> Self {
        self.multi_select = multi;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Declared field path: `field` or `field.child`
    pub fn declared_path(&self) -> String {
        let field = self.field.trim();
        match self.child.as_deref().map(str::trim) {
            Some(child) if !child.is_empty() => format!("{}.{}", field, child),
            _ => field.to_string(),
        }
    }

    /// Depth of the declared path
    pub fn depth(&self) -> usize {
        depth(&self.declared_path())
    }

    /// First option with the given key
    pub fn option(&self, key: &str) -> Option<&RuleOption> {
        self.options.iter().find(|o| o.key == key)
    }
}

/// Count of non-empty dot-separated segments
pub fn depth(path: &str) -> usize {
    path.split('.').filter(|s| !s.is_empty()).count()
}

/// Find the rule governing `path`.
///
/// One pass looks for an exact match; only if none exists does a second
/// pass look for a rule whose declared path is an ancestor of `path`.
/// Disabled rules still participate; callers filter on `enabled`.
pub fn match_rule<'a>(path: &str, rules: &'a [Rule]) -> Option<&'a Rule> {
    let declared: Vec<String> = rules.iter().map(Rule::declared_path).collect();

    if let Some(idx) = declared.iter().position(|p| p == path) {
        return Some(&rules[idx]);
    }

    declared
        .iter()
        .position(|p| is_descendant(path, p))
        .map(|idx| &rules[idx])
}

/// Find the enabled rule governing `path`
pub fn match_enabled<'a>(path: &str, rules: &'a [Rule]) -> Option<&'a Rule> {
    match_rule(path, rules).filter(|r| r.enabled)
}

fn is_descendant(path: &str, ancestor: &str) -> bool {
    !ancestor.is_empty()
        && path.len() > ancestor.len() + 1
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Depth
    // =========================================================================

    #[test]
    fn test_depth() {
        assert_eq!(depth("Exercises"), 1);
        assert_eq!(depth("Exercises.hiking"), 2);
        assert_eq!(depth("A.B.c"), 3);
        assert_eq!(depth(""), 0);
        assert_eq!(depth("A..B."), 2);
    }

    #[test]
    fn test_declared_path() {
        assert_eq!(Rule::new("Body").declared_path(), "Body");
        assert_eq!(Rule::new("Body").with_child("weight").declared_path(), "Body.weight");
        assert_eq!(Rule::new("Body").with_child("  ").declared_path(), "Body");
        assert_eq!(Rule::new("Body").with_child("weight").depth(), 2);
    }

    // =========================================================================
    // Matching
    // =========================================================================

    #[test]
    fn test_exact_match() {
        let rules = vec![Rule::new("Exercises").with_id("ex")];
        assert_eq!(match_rule("Exercises", &rules).map(|r| r.id.as_str()), Some("ex"));
    }

    #[test]
    fn test_descendant_match() {
        let rules = vec![Rule::new("Exercises").with_id("ex")];
        assert_eq!(
            match_rule("Exercises.hiking", &rules).map(|r| r.id.as_str()),
            Some("ex")
        );
    }

    #[test]
    fn test_no_partial_segment_match() {
        let rules = vec![Rule::new("Exercise")];
        assert!(match_rule("Exercises.hiking", &rules).is_none());
        assert!(match_rule("Exercise", &rules).is_some());
    }

    #[test]
    fn test_no_match() {
        let rules = vec![Rule::new("Mood")];
        assert!(match_rule("Exercises", &rules).is_none());
        assert!(match_rule("", &rules).is_none());
    }

    #[test]
    fn test_exact_beats_earlier_prefix() {
        let rules = vec![
            Rule::new("A").with_id("a"),
            Rule::new("A").with_child("B").with_id("ab"),
        ];
        assert_eq!(match_rule("A.B", &rules).map(|r| r.id.as_str()), Some("ab"));
    }

    #[test]
    fn test_specific_prefix_rule() {
        // Both are ancestors of A.B.c; A.B is declared first
        let rules = vec![
            Rule::new("A.B").with_id("ab"),
            Rule::new("A").with_id("a"),
        ];
        assert_eq!(match_rule("A.B.c", &rules).map(|r| r.id.as_str()), Some("ab"));
        assert_eq!(match_rule("A.X", &rules).map(|r| r.id.as_str()), Some("a"));
    }

    #[test]
    fn test_first_declared_wins() {
        let rules = vec![
            Rule::new("Mood").with_id("first"),
            Rule::new("Mood").with_id("second"),
        ];
        assert_eq!(match_rule("Mood", &rules).map(|r| r.id.as_str()), Some("first"));
    }

    #[test]
    fn test_match_enabled_filters() {
        let rules = vec![Rule::new("Mood").disabled()];
        assert!(match_rule("Mood", &rules).is_some());
        assert!(match_enabled("Mood", &rules).is_none());
    }

    // =========================================================================
    // Deserialization
    // =========================================================================

    #[test]
    fn test_rule_defaults() {
        let rule: Rule = serde_yaml::from_str("field: Exercises").unwrap();
        assert!(rule.enabled);
        assert!(!rule.id.is_empty());
        assert_eq!(rule.source, SourceType::Inline);
        assert!(!rule.multi_select);
        assert_eq!(rule.display, DisplayFlags::default());
    }

    #[test]
    fn test_value_config_defaults() {
        let config: ValueConfig = serde_yaml::from_str("type: number\nunits: [kg]").unwrap();
        assert_eq!(config.kind, ValueKind::Number);
        assert!(config.allow_decimals);
        assert_eq!(config.unit_behavior, UnitBehavior::Required);
    }
}
