//! Selection state machine and insertion recipe
//!
//! A [`SelectionSession`] is a plain value: every operation consumes the
//! current session and returns the next one. The session is bound to a
//! [`TriggerKey`]; binding it to a different key starts over with an empty
//! selection, so toggles never leak between contexts.
//!
//! In single mode a confirmation inserts immediately. In multi mode a
//! confirmation toggles the key, and closing the session inserts every
//! toggled key in toggle order.

use crate::context::INDENT_UNIT;
use crate::rules::Rule;
use crate::types::{DocumentId, Insertion, LineKind, PathContext, Position, SuggestionItem};
use serde::{Deserialize, Serialize};

/// Identity of the context a suggestion session was opened for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerKey {
    pub document: DocumentId,
    pub line: usize,
    pub path: String,
}

impl TriggerKey {
    pub fn new(document: DocumentId, ctx: &PathContext) -> Self {
        Self {
            document,
            line: ctx.line,
            path: ctx.path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

impl SelectionMode {
    pub fn for_rule(rule: &Rule) -> Self {
        if rule.multi_select {
            SelectionMode::Multi
        } else {
            SelectionMode::Single
        }
    }
}

/// Selection state for one suggestion session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSession {
    key: Option<TriggerKey>,
    mode: SelectionMode,
    selected: Vec<String>,
}

impl SelectionSession {
    /// An unbound, empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a trigger context. A different key resets the selection.
    pub fn bind(self, key: TriggerKey, mode: SelectionMode) -> Self {
        if self.key.as_ref() == Some(&key) && self.mode == mode {
            return self;
        }

        if !self.selected.is_empty() {
            log::debug!(
                "Context changed, discarding {} pending selection(s)",
                self.selected.len()
            );
        }

        Self {
            key: Some(key),
            mode,
            selected: Vec::new(),
        }
    }

    pub fn key(&self) -> Option<&TriggerKey> {
        self.key.as_ref()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Toggled-on keys, in toggle order
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.iter().any(|k| k == key)
    }

    /// Display text reflecting membership in multi mode
    pub fn render(&self, item: &SuggestionItem) -> String {
        match self.mode {
            SelectionMode::Single => item.display.clone(),
            SelectionMode::Multi if self.is_selected(&item.key) => format!("[x] {}", item.display),
            SelectionMode::Multi => format!("[ ] {}", item.display),
        }
    }

    /// Confirm a suggestion.
    ///
    /// Single mode returns the insertion and ends the session. Multi mode
    /// toggles the key and returns no insertion.
    pub fn confirm(
        mut self,
        item: &SuggestionItem,
        ctx: &PathContext,
        auto_indent: bool,
    ) -> (Self, Option<Insertion>) {
        match self.mode {
            SelectionMode::Single => {
                let insertion = build_insertion(ctx, &[item.key.clone()], auto_indent);
                (Self::new(), insertion)
            }
            SelectionMode::Multi => {
                self.toggle(&item.key);
                (self, None)
            }
        }
    }

    /// Toggle a key: remove if present, otherwise append
    pub fn toggle(&mut self, key: &str) {
        match self.selected.iter().position(|k| k == key) {
            Some(idx) => {
                self.selected.remove(idx);
            }
            None => self.selected.push(key.to_string()),
        }
    }

    /// Close the session, flushing any multi-select keys
    pub fn close(self, ctx: &PathContext, auto_indent: bool) -> (Self, Option<Insertion>) {
        let insertion = match self.mode {
            SelectionMode::Multi => build_insertion(ctx, &self.selected, auto_indent),
            SelectionMode::Single => None,
        };
        (Self::new(), insertion)
    }
}

/// Build the text edit inserting `keys` as children of the context's field.
///
/// On a field line the keys are appended after the line, each on its own
/// new line. On a placeholder line the first key replaces the line and
/// the rest follow on new lines; the replaced span starts at column 0, not
/// at the cursor, so the line's indentation and typed query are consumed.
/// Keys are indented one step deeper than the context's indentation when
/// `auto_indent` is set.
pub fn build_insertion(ctx: &PathContext, keys: &[String], auto_indent: bool) -> Option<Insertion> {
    let last = keys.last()?;

    let width = ctx.indent + if auto_indent { INDENT_UNIT } else { 0 };
    let indent = " ".repeat(width);
    let cursor_column = width + last.chars().count() + 2;

    let (start, end, text, cursor_line) = match ctx.kind {
        LineKind::Field => {
            let text: String = keys
                .iter()
                .map(|k| format!("\n{}{}: ", indent, k))
                .collect();
            let at = Position::new(ctx.line, ctx.line_len);
            (at, at, text, ctx.line + keys.len())
        }
        LineKind::Placeholder => {
            let text = keys
                .iter()
                .map(|k| format!("{}{}: ", indent, k))
                .collect::<Vec<_>>()
                .join("\n");
            (
                Position::new(ctx.line, 0),
                Position::new(ctx.line, ctx.line_len),
                text,
                ctx.line + keys.len() - 1,
            )
        }
    };

    Some(Insertion {
        start,
        end,
        text,
        cursor: Position::new(cursor_line, cursor_column),
        keys: keys.to_vec(),
    })
}
