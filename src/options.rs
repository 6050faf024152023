//! Inline option declarations
//!
//! Options can be written as compact declaration strings:
//!
//! ```text
//! hiking                       plain key
//! hiking: number               typed key
//! hiking: number | km, mi      typed key with unit allow-list
//! mood: enum | happy, sad      enum with allowed values
//! hiking|Outdoor walk|🥾       legacy key|description|icon
//! ```
//!
//! or as structured maps in the configuration file.

use serde::{Deserialize, Serialize};

/// Value type declared on an option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionType {
    Number {
        #[serde(default)]
        units: Vec<String>,
    },
    Boolean,
    Enum {
        #[serde(default)]
        values: Vec<String>,
    },
}

impl OptionType {
    /// Build a type from its declared name and parameter list
    pub fn from_declaration(name: &str, params: Vec<String>) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "number" => Some(OptionType::Number { units: params }),
            "boolean" => Some(OptionType::Boolean),
            "enum" => Some(OptionType::Enum { values: params }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OptionType::Number { .. } => "number",
            OptionType::Boolean => "boolean",
            OptionType::Enum { .. } => "enum",
        }
    }
}

/// One candidate child key of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OptionEntry")]
pub struct RuleOption {
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<OptionType>,
}

impl RuleOption {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: None,
            icon: None,
            value_type: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_type(mut self, value_type: OptionType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Parse a declaration string
    pub fn parse(declaration: &str) -> Self {
        parse_declaration(declaration)
    }
}

/// Raw configuration entry, either a declaration string or a map
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OptionEntry {
    Declaration(String),
    Structured {
        key: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        icon: Option<String>,
        #[serde(default, rename = "type")]
        value_type: Option<String>,
        #[serde(default)]
        units: Vec<String>,
        #[serde(default)]
        values: Vec<String>,
    },
}

impl From<OptionEntry> for RuleOption {
    fn from(entry: OptionEntry) -> Self {
        match entry {
            OptionEntry::Declaration(text) => parse_declaration(&text),
            OptionEntry::Structured {
                key,
                description,
                icon,
                value_type,
                units,
                values,
            } => {
                let value_type = value_type.and_then(|name| {
                    let params = if name.eq_ignore_ascii_case("enum") {
                        values
                    } else {
                        units
                    };
                    let parsed = OptionType::from_declaration(&name, params);
                    if parsed.is_none() {
                        log::warn!("Unknown type '{}' on option '{}', ignoring", name, key);
                    }
                    parsed
                });

                RuleOption {
                    key,
                    description,
                    icon,
                    value_type,
                }
            }
        }
    }
}

/// Parse an inline option declaration
pub fn parse_declaration(declaration: &str) -> RuleOption {
    let text = declaration.trim();

    let Some((key, rest)) = text.split_once(':') else {
        return parse_legacy(text);
    };

    let mut option = RuleOption::new(key.trim());

    let (type_name, params) = match rest.split_once('|') {
        Some((type_name, params)) => (type_name.trim(), split_params(params)),
        None => (rest.trim(), Vec::new()),
    };

    if type_name.is_empty() {
        return option;
    }

    match OptionType::from_declaration(type_name, params) {
        Some(value_type) => option.value_type = Some(value_type),
        None => log::warn!(
            "Unknown type '{}' in option declaration '{}', treating as untyped",
            type_name,
            text
        ),
    }

    option
}

/// Legacy `key|description|icon` form
fn parse_legacy(text: &str) -> RuleOption {
    let mut parts = text.split('|').map(str::trim);
    let key = parts.next().unwrap_or_default();
    let mut option = RuleOption::new(key);

    if let Some(description) = parts.next().filter(|d| !d.is_empty()) {
        option.description = Some(description.to_string());
    }
    if let Some(icon) = parts.next().filter(|i| !i.is_empty()) {
        option.icon = Some(icon.to_string());
    }

    option
}

fn split_params(params: &str) -> Vec<String> {
    params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
