//! Integration tests for the fieldsense engine and CLI

use fieldsense::rules::depth;
use fieldsense::{
    match_rule, Config, DocumentId, Engine, Rule, SelectionMode, SelectionSession, ValueError,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const CONFIG: &str = r#"
settings:
  max_suggestions: 10
rules:
  - id: exercises
    field: Exercises
    multi_select: true
    options:
      - "hiking: number | km, mi"
      - "running: number | km"
      - "yoga|Stretching|🧘"
  - id: body
    field: Body
    options: [weight, height]
  - id: mood
    field: Mood
    value:
      type: enum
      values: [happy, sad]
  - id: done
    field: Done
    value:
      type: boolean
"#;

const NOTE: &str =
    "---\nExercises:\n  hiking: 10miles\n  running: 5km\nMood: Happy\nDone: maybe\n---\n# Day\n";

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("fieldsense.yaml");
    fs::write(&path, CONFIG).unwrap();
    path
}

fn engine() -> Engine {
    let config: Config = serde_yaml::from_str(CONFIG).unwrap();
    Engine::new(config)
}

fn keys(items: &[fieldsense::SuggestionItem]) -> Vec<&str> {
    items.iter().map(|i| i.key.as_str()).collect()
}

// =============================================================================
// Paths and matching
// =============================================================================

#[test]
fn test_depth_counts_segments() {
    assert_eq!(depth("Exercises"), 1);
    assert_eq!(depth("Exercises.hiking"), 2);
    assert_eq!(depth(".Exercises..hiking."), 2);
    assert_eq!(depth(""), 0);
}

#[test]
fn test_resolver_round_trip() {
    let source = "---\nExercises:\n  hiking: 10km\n---";
    let ctx = engine().context(source, 2, 4).unwrap();

    assert_eq!(ctx.path, "Exercises.hiking");
    assert_eq!(ctx.indent, 2);
}

#[test]
fn test_cursor_outside_block() {
    assert!(engine().context(NOTE, 7, 0).is_none());
    assert!(engine().context(NOTE, 0, 0).is_none());
}

#[test]
fn test_descendant_rule_precedence() {
    let rules = vec![
        Rule::new("A.B").with_id("ab"),
        Rule::new("A").with_id("a"),
    ];
    assert_eq!(match_rule("A.B.c", &rules).map(|r| r.id.as_str()), Some("ab"));
    assert_eq!(match_rule("A.x", &rules).map(|r| r.id.as_str()), Some("a"));
    assert_eq!(match_rule("A", &rules).map(|r| r.id.as_str()), Some("a"));
    assert!(match_rule("AB", &rules).is_none());
}

// =============================================================================
// Suggestions
// =============================================================================

#[test]
fn test_existing_children_deduplicated() {
    let source = "---\nExercises:\n  hiking: 10km\n---";
    let suggestions = engine().suggest(source, 1, 10).unwrap();

    assert_eq!(keys(&suggestions.items), vec!["running", "yoga"]);
}

#[test]
fn test_existing_children_deduplicated_on_broken_block() {
    let source = "---\nExercises:\n  hiking: [10km\n---";
    let suggestions = engine().suggest(source, 1, 10).unwrap();

    assert_eq!(keys(&suggestions.items), vec!["running", "yoga"]);
}

#[test]
fn test_numeric_looking_keys_deduplicated() {
    let config: Config = serde_yaml::from_str(
        r#"
rules:
  - field: Versions
    options: ["1.10", "007", "2.0"]
"#,
    )
    .unwrap();
    let engine = Engine::new(config);

    let source = "---\nVersions:\n  1.10: x\n  007: y\n---";
    let suggestions = engine.suggest(source, 1, 9).unwrap();

    assert_eq!(keys(&suggestions.items), vec!["2.0"]);
}

#[test]
fn test_query_filters_key_and_description() {
    let source = "---\nExercises:\nstretch\n---";
    let suggestions = engine().suggest(source, 2, 7).unwrap();

    assert_eq!(suggestions.query, "stretch");
    assert_eq!(keys(&suggestions.items), vec!["yoga"]);
    assert_eq!(suggestions.items[0].display, "🧘 yoga - Stretching");
}

#[test]
fn test_no_suggestions_below_rule_level() {
    let source = "---\nExercises:\n  hiking: 10km\n---";
    assert!(engine().suggest(source, 2, 14).is_none());
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_single_select_edit() {
    let engine = engine();
    let source = "---\nBody:\ntitle: x\n---";
    let suggestions = engine.suggest(source, 1, 5).unwrap();
    assert_eq!(suggestions.mode, SelectionMode::Single);

    let session =
        engine.bind_session(SelectionSession::new(), DocumentId::from("day.md"), &suggestions);
    let (session, insertion) =
        engine.confirm(session, &suggestions.items[0], &suggestions.context);

    let insertion = insertion.unwrap();
    assert_eq!(insertion.apply(source), "---\nBody:\n  weight: \ntitle: x\n---");
    assert_eq!((insertion.cursor.line, insertion.cursor.column), (2, 10));
    assert!(session.key().is_none());
}

#[test]
fn test_multi_select_flush_order() {
    let engine = engine();
    let source = "---\nBody: \nExercises:\n\n---\n";
    let suggestions = engine.suggest(source, 3, 0).unwrap();
    assert_eq!(suggestions.mode, SelectionMode::Multi);

    let item = |key: &str| {
        suggestions
            .items
            .iter()
            .find(|i| i.key == key)
            .cloned()
            .unwrap()
    };

    let mut session =
        engine.bind_session(SelectionSession::new(), DocumentId::from("day.md"), &suggestions);
    for key in ["hiking", "running", "hiking", "hiking"] {
        let (next, insertion) = engine.confirm(session, &item(key), &suggestions.context);
        assert!(insertion.is_none());
        session = next;
    }
    assert_eq!(session.render(&item("running")), "[x] running");

    let (session, insertion) = engine.close(session, &suggestions.context);
    let insertion = insertion.unwrap();

    assert_eq!(insertion.keys, vec!["running", "hiking"]);
    assert_eq!(
        insertion.apply(source),
        "---\nBody: \nExercises:\n  running: \n  hiking: \n---\n"
    );
    assert_eq!((insertion.cursor.line, insertion.cursor.column), (4, 10));
    assert!(session.selected().is_empty());
}

#[test]
fn test_session_reset_on_new_context() {
    let engine = engine();
    let source = "---\nExercises:\n\n---\n";
    let suggestions = engine.suggest(source, 2, 0).unwrap();

    let session =
        engine.bind_session(SelectionSession::new(), DocumentId::from("a.md"), &suggestions);
    let (session, _) = engine.confirm(session, &suggestions.items[0], &suggestions.context);
    assert_eq!(session.selected().len(), 1);

    let session = engine.bind_session(session, DocumentId::from("b.md"), &suggestions);
    assert!(session.selected().is_empty());
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validate_document_from_config_file() {
    let temp = TempDir::new().unwrap();
    let mut engine = Engine::load(&write_config(&temp)).unwrap();

    let report = engine
        .validate_document(&DocumentId::from("day.md"), NOTE)
        .unwrap();

    let found: Vec<(usize, ValueError)> = report
        .diagnostics
        .iter()
        .map(|d| (d.line, d.error))
        .collect();

    assert_eq!(
        found,
        vec![
            (2, ValueError::InvalidUnit),
            (4, ValueError::InvalidValue),
            (5, ValueError::InvalidBoolean),
        ]
    );
    assert_eq!(report.checked, 4);
    assert_eq!(report.diagnostics[0].suggestion, "valid units: km, mi");
}

#[test]
fn test_unchanged_document_validated_once() {
    let mut engine = engine();
    let id = DocumentId::from("day.md");

    assert!(engine.validate_document(&id, NOTE).is_some());
    assert!(engine.validate_document(&id, NOTE).is_none());
    assert_eq!(engine.passes(), 1);
}

#[test]
fn test_validate_single_line() {
    let validation = engine().validate_line(NOTE, 3).unwrap();
    assert_eq!(validation.path, "Exercises.running");
    assert!(validation.result.is_valid());
}

// =============================================================================
// CLI
// =============================================================================

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fieldsense"))
}

#[test]
fn test_cli_validate_reports_invalid() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);
    let notes = temp.path().join("notes");
    fs::create_dir(&notes).unwrap();
    fs::write(notes.join("day.md"), NOTE).unwrap();
    fs::write(notes.join("skip.txt"), NOTE).unwrap();

    let output = binary()
        .arg("--config")
        .arg(&config)
        .arg("validate")
        .arg(&notes)
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("invalid unit"));
    assert!(stdout.contains("1 file(s)"));
}

#[test]
fn test_cli_validate_clean() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);
    let note = temp.path().join("clean.md");
    fs::write(&note, "---\nMood: happy\nDone: yes\n---\n").unwrap();

    let status = binary()
        .arg("--config")
        .arg(&config)
        .arg("validate")
        .arg(&note)
        .status()
        .unwrap();

    assert!(status.success());
}

#[test]
fn test_cli_complete_json() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);
    let note = temp.path().join("day.md");
    fs::write(&note, "---\nExercises:\n---\n").unwrap();

    let output = binary()
        .arg("--config")
        .arg(&config)
        .args(["--format", "json", "complete"])
        .arg(&note)
        .args(["--line", "2", "--column", "11"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["rule_id"], "exercises");
    assert_eq!(json["mode"], "multi");
    assert_eq!(json["items"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_cli_single_select_takes_one_key() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);
    let note = temp.path().join("day.md");
    fs::write(&note, "---\nBody:\n---\n").unwrap();

    let run = |keys: &[&str]| {
        let mut cmd = binary();
        cmd.arg("--config")
            .arg(&config)
            .args(["--format", "json", "complete"])
            .arg(&note)
            .args(["--line", "2", "--column", "6"]);
        for key in keys {
            cmd.args(["--select", key]);
        }
        cmd.output().unwrap()
    };

    let output = run(&["weight", "height"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("single-select"));

    let output = run(&["weight"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(1));
    assert_eq!(json[0]["text"], "\n  weight: ");
}
