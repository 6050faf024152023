//! fieldsense - Field-path autocomplete and value validation for frontmatter
//!
//! This library resolves where a cursor sits inside a document's delimited
//! key/value block, offers configured child keys for that position, drives
//! single and multi-select insertion, and checks field values against
//! declared grammars.
//!
//! # Architecture
//!
//! ```text
//! CLI/Editor -> Engine -> context (Frontmatter -> PathContext)
//!                     |-> rules (match_rule) -> completions -> selection
//!                     +-> driver (DocumentValidator, ValidationScheduler) -> validation
//! ```
//!
//! # Configuration
//!
//! Rules map a dotted field path to candidate children:
//!
//! ```yaml
//! settings:
//!   max_suggestions: 10
//!
//! rules:
//!   - field: Exercises
//!     multi_select: true
//!     options:
//!       - "hiking: number | km, mi"
//!       - "stretched: boolean"
//!       - "yoga|Stretching|🧘"
//! ```

pub mod completions;
pub mod config;
pub mod context;
pub mod driver;
pub mod options;
pub mod rules;
pub mod selection;
pub mod types;
pub mod validation;

// Re-export main types
pub use config::{Config, ConfigError, Settings};
pub use context::{parse_context, resolve, Frontmatter};
pub use driver::{
    DocumentValidator, FieldValidation, LineDiagnostic, LineKey, TaskHandle, ValidationReport,
    ValidationScheduler,
};
pub use options::{OptionType, RuleOption};
pub use rules::{match_rule, Rule, SourceType};
pub use selection::{build_insertion, SelectionMode, SelectionSession, TriggerKey};
pub use types::{DocumentId, Insertion, LineKind, PathContext, Position, SuggestionItem};
pub use validation::{validate, ValidationResult, ValueError, ValueSpec};

use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

/// Suggestions for one cursor position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestions {
    pub context: PathContext,
    pub rule_id: String,
    pub mode: SelectionMode,
    pub query: String,
    pub items: Vec<SuggestionItem>,
}

/// Main engine
pub struct Engine {
    config: Config,
    validator: DocumentValidator,
    scheduler: ValidationScheduler,
}

impl Engine {
    /// Create engine from a loaded configuration
    pub fn new(config: Config) -> Self {
        let delay = Duration::from_millis(config.settings.validation_delay_ms);
        Self {
            config,
            validator: DocumentValidator::new(),
            scheduler: ValidationScheduler::new(delay),
        }
    }

    /// Create engine from a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(Config::load(path)?))
    }

    /// Path context at a cursor position (0-based)
    pub fn context(&self, source: &str, line: usize, column: usize) -> Option<PathContext> {
        Frontmatter::parse(source, &self.config.settings.delimiter)?.resolve(line, column)
    }

    /// Suggestions at a cursor position (0-based).
    ///
    /// `None` when the cursor is outside the block, no enabled rule handles
    /// the path, the cursor is not at the rule's own nesting level, or the
    /// typed query is shorter than `min_query_length`.
    pub fn suggest(&self, source: &str, line: usize, column: usize) -> Option<Suggestions> {
        let settings = &self.config.settings;
        let frontmatter = Frontmatter::parse(source, &settings.delimiter)?;
        let ctx = frontmatter.resolve(line, column)?;
        let rule = rules::match_enabled(&ctx.path, &self.config.rules)?;

        if ctx.depth() != rule.depth() {
            return None;
        }

        if ctx.query.chars().count() < settings.min_query_length {
            return None;
        }

        let existing = frontmatter.existing_child_keys(&ctx);
        let items = completions::get_suggestions(rule, &ctx, &existing, settings);

        Some(Suggestions {
            rule_id: rule.id.clone(),
            mode: SelectionMode::for_rule(rule),
            query: ctx.query.clone(),
            context: ctx,
            items,
        })
    }

    /// Bind a selection session to the context of `suggestions`
    pub fn bind_session(
        &self,
        session: SelectionSession,
        document: DocumentId,
        suggestions: &Suggestions,
    ) -> SelectionSession {
        session.bind(
            TriggerKey::new(document, &suggestions.context),
            suggestions.mode,
        )
    }

    /// Confirm a suggestion in a session
    pub fn confirm(
        &self,
        session: SelectionSession,
        item: &SuggestionItem,
        ctx: &PathContext,
    ) -> (SelectionSession, Option<Insertion>) {
        session.confirm(item, ctx, self.config.settings.auto_indent)
    }

    /// Close a session, flushing pending multi-select keys
    pub fn close(
        &self,
        session: SelectionSession,
        ctx: &PathContext,
    ) -> (SelectionSession, Option<Insertion>) {
        session.close(ctx, self.config.settings.auto_indent)
    }

    /// Validate a document.
    ///
    /// `None` when validation is disabled or the text is unchanged since
    /// the last pass for `document`.
    pub fn validate_document(
        &mut self,
        document: &DocumentId,
        source: &str,
    ) -> Option<ValidationReport> {
        if !self.config.settings.validate {
            return None;
        }
        self.validator.validate(document, source, &self.config)
    }

    /// Drop the remembered text of a closed document.
    ///
    /// The next `validate_document` call for it always runs a pass.
    pub fn forget_document(&mut self, document: &DocumentId) {
        self.validator.forget(document);
    }

    /// Validate a single line (0-based)
    pub fn validate_line(&self, source: &str, line: usize) -> Option<FieldValidation> {
        driver::validate_line(source, line, &self.config)
    }

    /// Schedule re-validation of a line, superseding a pending one
    pub fn schedule_validation(
        &mut self,
        document: DocumentId,
        line: usize,
        now: Instant,
    ) -> TaskHandle {
        self.scheduler.schedule(LineKey::new(document, line), now)
    }

    /// Documents with a line validation due at `now`
    pub fn due_documents(&mut self, now: Instant) -> Vec<DocumentId> {
        let mut seen = HashSet::new();
        self.scheduler
            .take_due(now)
            .into_iter()
            .map(|key| key.document)
            .filter(|document| seen.insert(document.clone()))
            .collect()
    }

    /// Completed validation passes
    pub fn passes(&self) -> usize {
        self.validator.passes()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.config.settings
    }

    pub fn rules(&self) -> &[Rule] {
        &self.config.rules
    }
}
