//! Frontmatter context resolver: turns a cursor position into a field path.
//!
//! Indentation is the single source of structure. Every path is derived by
//! walking upward from the cursor line, collecting the nearest field tokens
//! whose indentation steps down by [`INDENT_UNIT`]. A structured YAML parse
//! of the block is attempted as well, but it is only ever used to recover
//! values and existing child keys; when it fails the resolver silently
//! degrades to the indentation heuristic.

use crate::types::{LineKind, PathContext};
use regex::Regex;
use serde_yaml::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

/// Default block delimiter
pub const DEFAULT_DELIMITER: &str = "---";

/// Indentation step between a key and its children
pub const INDENT_UNIT: usize = 2;

/// `key:` followed by an optional value. Keys may contain any characters
/// except whitespace and `:`, with internal runs of whitespace allowed.
static FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^\s:]+(?:\s+[^\s:]+)*):\s*(.*)$").unwrap()
});

/// A line carrying a field token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLine<'a> {
    /// Leading whitespace characters
    pub indent: usize,
    /// Field name
    pub key: &'a str,
    /// Text after the colon, leading whitespace trimmed
    pub value: &'a str,
    /// Character column where `value` starts
    pub value_column: usize,
}

/// Parse a `key: value` line
pub fn parse_field_line(line: &str) -> Option<FieldLine<'_>> {
    let caps = FIELD_REGEX.captures(line)?;
    let key = caps.get(1)?;
    let value = caps.get(2)?;

    Some(FieldLine {
        indent: indentation(line),
        key: key.as_str(),
        value: value.as_str(),
        value_column: line[..value.start()].chars().count(),
    })
}

/// Count of leading whitespace characters. Tabs count as one.
pub fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Line range of the delimited block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Opening delimiter line
    pub start: usize,
    /// Closing delimiter line
    pub end: usize,
}

impl Block {
    /// Locate the block. The first line must be the delimiter; the block
    /// ends at the next line equal to the delimiter.
    pub fn locate(lines: &[&str], delimiter: &str) -> Option<Self> {
        let first = lines.first()?;
        if first.trim() != delimiter {
            return None;
        }

        let end = lines
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, l)| l.trim() == delimiter)
            .map(|(i, _)| i)?;

        Some(Self { start: 0, end })
    }

    /// Whether `line` is strictly inside the delimiters
    pub fn contains(&self, line: usize) -> bool {
        line > self.start && line < self.end
    }

    /// Interior line indices
    pub fn interior(&self) -> std::ops::Range<usize> {
        self.start + 1..self.end
    }
}

/// Outcome of the structured parse of the block interior
#[derive(Debug, Clone, PartialEq)]
pub enum BlockTree {
    Parsed(Value),
    Failed,
}

impl BlockTree {
    /// Parse the block interior as a YAML mapping
    pub fn parse(lines: &[&str], block: &Block) -> Self {
        let interior = lines[block.interior()].join("\n");

        match serde_yaml::from_str::<Value>(&interior) {
            Ok(value) => BlockTree::Parsed(value),
            Err(e) => {
                log::debug!("Block parse failed, using indentation heuristic: {}", e);
                BlockTree::Failed
            }
        }
    }

    pub fn tree(&self) -> Option<&Value> {
        match self {
            BlockTree::Parsed(value) => Some(value),
            BlockTree::Failed => None,
        }
    }

    /// Descend the tree along a dotted path
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = self.tree()?;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = child(current, segment)?;
        }
        Some(current)
    }

    /// Keys of the mapping at `path`.
    ///
    /// `None` when the tree is unavailable or the path is missing from it.
    pub fn child_keys(&self, path: &str) -> Option<Vec<String>> {
        let node = self.lookup(path)?;
        let keys = node
            .as_mapping()
            .map(|m| m.keys().filter_map(key_text).collect())
            .unwrap_or_default();
        Some(keys)
    }
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_mapping()?
        .iter()
        .find(|(k, _)| key_text(k).as_deref() == Some(key))
        .map(|(_, v)| v)
}

/// Render a mapping key as it appears in the source
fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A document's frontmatter block, located and parsed once
#[derive(Debug, Clone)]
pub struct Frontmatter<'a> {
    lines: Vec<&'a str>,
    block: Block,
    tree: BlockTree,
}

impl<'a> Frontmatter<'a> {
    /// Locate and parse the block in `source`
    pub fn parse(source: &'a str, delimiter: &str) -> Option<Self> {
        Self::from_lines(source.lines().collect(), delimiter)
    }

    pub fn from_lines(lines: Vec<&'a str>, delimiter: &str) -> Option<Self> {
        let block = Block::locate(&lines, delimiter)?;
        let tree = BlockTree::parse(&lines, &block);
        Some(Self { lines, block, tree })
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Resolve the path context at a cursor position (0-based)
    pub fn resolve(&self, line: usize, column: usize) -> Option<PathContext> {
        if !self.block.contains(line) {
            return None;
        }

        let text = self.lines[line];
        let walk = self.walk(line)?;
        let path = walk.segments.join(".");

        let line_len = text.chars().count();
        let column = column.min(line_len);
        let indent = indentation(text);

        let (kind, query, query_start) = match parse_field_line(text) {
            Some(field) => {
                let typed = if column > field.value_column {
                    slice_chars(text, field.value_column, column)
                } else {
                    String::new()
                };
                (LineKind::Field, typed.trim().to_string(), field.value_column)
            }
            None => {
                let start = indent.min(column);
                let typed = slice_chars(text, start, column);
                (LineKind::Placeholder, typed.trim().to_string(), start)
            }
        };

        let value = self.tree.lookup(&path).cloned();

        Some(PathContext {
            path,
            line,
            indent,
            value,
            kind,
            key_line: walk.key_line,
            column,
            line_len,
            query,
            query_start,
        })
    }

    /// Upward indentation walk from `line`
    fn walk(&self, line: usize) -> Option<Walk<'a>> {
        let text = self.lines[line];
        let mut segments: VecDeque<&'a str> = VecDeque::new();
        let mut key_line = None;

        let mut expected = match parse_field_line(text) {
            Some(field) => {
                segments.push_front(field.key);
                key_line = Some(line);
                field.indent as isize - INDENT_UNIT as isize
            }
            None => indentation(text) as isize,
        };

        for idx in (self.block.start + 1..line).rev() {
            if expected < 0 {
                break;
            }

            let candidate = self.lines[idx];
            if is_blank(candidate) {
                continue;
            }

            if let Some(field) = parse_field_line(candidate) {
                if field.indent as isize == expected {
                    segments.push_front(field.key);
                    key_line.get_or_insert(idx);
                    expected = field.indent as isize - INDENT_UNIT as isize;
                }
            }
        }

        Some(Walk {
            segments: segments.into(),
            key_line: key_line?,
        })
    }

    /// Existing child keys under the key at `ctx.key_line`, spelled as in
    /// the source.
    ///
    /// Scans the following lines at one indentation step deeper until a
    /// line at or above the parent's indentation ends the scan. The parsed
    /// tree is consulted only when the scan finds nothing, which covers
    /// flow mappings such as `Exercises: {hiking: 1}`.
    pub fn existing_child_keys(&self, ctx: &PathContext) -> Vec<String> {
        let keys = self.scan_child_keys(ctx.key_line);
        if !keys.is_empty() {
            return keys;
        }

        self.tree.child_keys(&ctx.path).unwrap_or_default()
    }

    /// Field keys one indentation step below the key at `key_line`
    fn scan_child_keys(&self, key_line: usize) -> Vec<String> {
        let parent_indent = indentation(self.lines[key_line]);
        let mut keys = Vec::new();

        for idx in key_line + 1..self.block.end {
            let text = self.lines[idx];
            if is_blank(text) {
                continue;
            }

            let indent = indentation(text);
            if indent <= parent_indent {
                break;
            }

            if indent == parent_indent + INDENT_UNIT {
                if let Some(field) = parse_field_line(text) {
                    keys.push(field.key.to_string());
                }
            }
        }

        keys
    }

    /// Every field line in the block with its path, in one forward pass.
    ///
    /// Yields the same paths as [`Frontmatter::resolve`] on each line: the
    /// nearest preceding field line one step shallower is the parent.
    pub fn field_lines(&self) -> Vec<ResolvedField<'a>> {
        let mut last_at_indent: HashMap<usize, String> = HashMap::new();
        let mut fields = Vec::new();

        for idx in self.block.interior() {
            let text = self.lines[idx];
            let Some(field) = parse_field_line(text) else {
                continue;
            };

            let parent = field
                .indent
                .checked_sub(INDENT_UNIT)
                .and_then(|i| last_at_indent.get(&i));

            let path = match parent {
                Some(parent) => format!("{}.{}", parent, field.key),
                None => field.key.to_string(),
            };

            last_at_indent.insert(field.indent, path.clone());
            fields.push(ResolvedField {
                line: idx,
                path,
                field,
            });
        }

        fields
    }
}

struct Walk<'a> {
    segments: Vec<&'a str>,
    key_line: usize,
}

/// A field line with its resolved path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField<'a> {
    pub line: usize,
    pub path: String,
    pub field: FieldLine<'a>,
}

fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}

/// Resolve the path context at a cursor position (0-based) using the
/// default delimiter
pub fn resolve(line: usize, column: usize, lines: &[&str]) -> Option<PathContext> {
    Frontmatter::from_lines(lines.to_vec(), DEFAULT_DELIMITER)?.resolve(line, column)
}

/// Resolve from document text
pub fn parse_context(source: &str, line: usize, column: usize) -> Option<PathContext> {
    Frontmatter::parse(source, DEFAULT_DELIMITER)?.resolve(line, column)
}
