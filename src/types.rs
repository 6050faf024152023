//! Core types for fieldsense

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in a document (0-based line and character column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Identity of a document (usually its path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Shape of the line the cursor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Line carries a `key:` field token
    Field,
    /// Line has no field token (blank item, partially typed key)
    Placeholder,
}

/// Hierarchical position of the cursor inside the frontmatter block.
///
/// Recomputed on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathContext {
    /// Dot-joined field path, e.g. `Exercises.hiking`
    pub path: String,

    /// Cursor line (0-based)
    pub line: usize,

    /// Leading whitespace characters on the cursor line
    pub indent: usize,

    /// Value stored at `path` when the block parsed cleanly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_yaml::Value>,

    /// Field line or placeholder line
    pub kind: LineKind,

    /// Line holding the innermost key of `path`
    pub key_line: usize,

    /// Cursor column (0-based, characters)
    pub column: usize,

    /// Length of the cursor line in characters
    pub line_len: usize,

    /// Text typed before the cursor, trimmed
    pub query: String,

    /// Column where the typed query starts
    pub query_start: usize,
}

impl PathContext {
    /// Number of path segments
    pub fn depth(&self) -> usize {
        crate::rules::depth(&self.path)
    }

    /// Last path segment
    pub fn leaf(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// One candidate insertion offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    /// Rule that produced this item
    pub rule_id: String,

    /// Option key
    pub key: String,

    /// Text shown in the suggestion list
    pub display: String,

    /// Text inserted on confirmation
    pub insert_text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Concrete text edit produced by a confirmed selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insertion {
    /// Start of the replaced span
    pub start: Position,

    /// End of the replaced span (equal to `start` for a pure insertion)
    pub end: Position,

    /// Replacement text
    pub text: String,

    /// Cursor position after the edit is applied
    pub cursor: Position,

    /// Keys inserted, in order
    pub keys: Vec<String>,
}

impl Insertion {
    /// Apply this edit to a document, returning the new text.
    ///
    /// Positions past the end of a line are clamped.
    pub fn apply(&self, source: &str) -> String {
        let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
        while lines.len() <= self.end.line {
            lines.push(String::new());
        }

        let start_line = &lines[self.start.line];
        let prefix: String = start_line.chars().take(self.start.column).collect();
        let end_line = &lines[self.end.line];
        let suffix: String = end_line.chars().skip(self.end.column).collect();

        let replaced = format!("{}{}{}", prefix, self.text, suffix);
        let new_lines: Vec<String> = replaced.split('\n').map(str::to_string).collect();
        lines.splice(self.start.line..=self.end.line, new_lines);

        let mut out = lines.join("\n");
        if source.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}
