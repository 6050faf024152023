//! Validation driver
//!
//! Runs value validation over every field line of a document's block and
//! schedules re-validation per line behind a debounce delay.

use crate::config::Config;
use crate::context::{Frontmatter, ResolvedField};
use crate::rules::{match_enabled, Rule};
use crate::validation::{validate, ValidationResult, ValueError, ValueSpec};
use crate::types::DocumentId;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Validation outcome for one field line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidation {
    /// 0-based line
    pub line: usize,
    pub path: String,
    pub rule_id: String,
    pub value: String,
    /// Column span of the value on its line
    pub start: usize,
    pub end: usize,
    pub result: ValidationResult,
}

/// An invalid value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiagnostic {
    pub line: usize,
    pub path: String,
    pub rule_id: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub error: ValueError,
    pub suggestion: String,
}

impl LineDiagnostic {
    fn from_validation(validation: FieldValidation) -> Option<Self> {
        let ValidationResult::Invalid { error, suggestion } = validation.result else {
            return None;
        };

        Some(Self {
            line: validation.line,
            path: validation.path,
            rule_id: validation.rule_id,
            value: validation.value,
            start: validation.start,
            end: validation.end,
            error,
            suggestion,
        })
    }
}

/// Result of one validation pass over a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub document: DocumentId,
    /// Number of values a grammar applied to
    pub checked: usize,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Validate one resolved field line.
///
/// `None` when no enabled rule handles the path or the rule supplies no
/// grammar for the field.
pub fn validate_field(field: &ResolvedField<'_>, rules: &[Rule]) -> Option<FieldValidation> {
    let rule = match_enabled(&field.path, rules)?;
    let spec = ValueSpec::for_field(rule, field.field.key)?;

    let value = field.field.value;
    let start = field.field.value_column;

    Some(FieldValidation {
        line: field.line,
        path: field.path.clone(),
        rule_id: rule.id.clone(),
        value: value.to_string(),
        start,
        end: start + value.chars().count(),
        result: validate(value, &spec),
    })
}

/// Validate every field line of a parsed block
pub fn validate_block(frontmatter: &Frontmatter<'_>, rules: &[Rule]) -> Vec<FieldValidation> {
    frontmatter
        .field_lines()
        .iter()
        .filter_map(|field| validate_field(field, rules))
        .collect()
}

/// Validate a single line of `source`
pub fn validate_line(source: &str, line: usize, config: &Config) -> Option<FieldValidation> {
    let frontmatter = Frontmatter::parse(source, &config.settings.delimiter)?;
    let field = frontmatter
        .field_lines()
        .into_iter()
        .find(|field| field.line == line)?;

    validate_field(&field, &config.rules)
}

/// Per-document validation passes, skipping unchanged text
#[derive(Debug, Default)]
pub struct DocumentValidator {
    last_text: HashMap<DocumentId, String>,
    passes: usize,
}

impl DocumentValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a pass over `source`.
    ///
    /// Returns `None` without doing any work when `source` equals the text
    /// of the last completed pass for `document`.
    pub fn validate(
        &mut self,
        document: &DocumentId,
        source: &str,
        config: &Config,
    ) -> Option<ValidationReport> {
        if self.last_text.get(document).map(String::as_str) == Some(source) {
            log::debug!("Skipping validation of {}: text unchanged", document);
            return None;
        }

        let validations = match Frontmatter::parse(source, &config.settings.delimiter) {
            Some(frontmatter) => validate_block(&frontmatter, &config.rules),
            None => Vec::new(),
        };

        let checked = validations.len();
        let diagnostics = validations
            .into_iter()
            .filter_map(LineDiagnostic::from_validation)
            .collect();

        self.last_text.insert(document.clone(), source.to_string());
        self.passes += 1;

        Some(ValidationReport {
            document: document.clone(),
            checked,
            diagnostics,
        })
    }

    /// Forget the last validated text of a document
    pub fn forget(&mut self, document: &DocumentId) {
        self.last_text.remove(document);
    }

    /// Completed passes
    pub fn passes(&self) -> usize {
        self.passes
    }
}

/// Identity of a scheduled line validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub document: DocumentId,
    pub line: usize,
}

impl LineKey {
    pub fn new(document: DocumentId, line: usize) -> Self {
        Self { document, line }
    }
}

/// Cancellation handle for a scheduled task
#[derive(Debug, Clone, Default)]
pub struct TaskHandle(Arc<AtomicBool>);

impl TaskHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct ScheduledTask {
    due: Instant,
    handle: TaskHandle,
}

/// Debounce timers keyed by document line.
///
/// Scheduling a line again cancels its pending task and restarts the delay,
/// so only the most recent request for a line ever comes due.
#[derive(Debug)]
pub struct ValidationScheduler {
    delay: Duration,
    tasks: HashMap<LineKey, ScheduledTask>,
}

impl ValidationScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            tasks: HashMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule validation of `key`, superseding any pending task for it
    pub fn schedule(&mut self, key: LineKey, now: Instant) -> TaskHandle {
        let handle = TaskHandle::default();
        let task = ScheduledTask {
            due: now + self.delay,
            handle: handle.clone(),
        };

        if let Some(previous) = self.tasks.insert(key.clone(), task) {
            log::debug!("Superseding pending validation of {} line {}", key.document, key.line);
            previous.handle.cancel();
        }

        handle
    }

    /// Remove and return every task due at `now`, earliest first.
    /// Cancelled tasks are dropped.
    pub fn take_due(&mut self, now: Instant) -> Vec<LineKey> {
        self.tasks.retain(|_, task| !task.handle.is_cancelled());

        let mut due: Vec<(Instant, LineKey)> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.due <= now)
            .map(|(key, task)| (task.due, key.clone()))
            .collect();
        due.sort();

        for (_, key) in &due {
            self.tasks.remove(key);
        }

        due.into_iter().map(|(_, key)| key).collect()
    }

    /// Earliest pending deadline
    pub fn next_due(&self) -> Option<Instant> {
        self.tasks
            .values()
            .filter(|task| !task.handle.is_cancelled())
            .map(|task| task.due)
            .min()
    }

    pub fn pending(&self) -> usize {
        self.tasks
            .values()
            .filter(|task| !task.handle.is_cancelled())
            .count()
    }
}

impl Default for ValidationScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::Settings::default().validation_delay_ms))
    }
}
