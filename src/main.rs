//! fieldsense CLI - Field-path autocomplete and value validation
//!
//! # Usage
//!
//! ```bash
//! # Show the path context at a position
//! fieldsense context note.md --line 3 --column 1
//!
//! # Get suggestions at a position
//! fieldsense complete note.md --line 3 --column 1
//!
//! # Confirm suggestions and print the resulting edit
//! fieldsense complete note.md -l 3 -c 1 --select hiking --select running
//!
//! # Validate field values in a directory tree
//! fieldsense validate ./notes --include "*.md"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fieldsense::{
    Config, DocumentId, Engine, Insertion, SelectionMode, SelectionSession, Suggestions,
    ValidationReport,
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "fieldsense")]
#[command(about = "Field-path autocomplete and value validation for frontmatter")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to .fieldsense.yaml and friends in the current directory)
    #[arg(long, env = "FIELDSENSE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, short, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and show the path context
    Context {
        /// Path to document
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long, short)]
        line: usize,

        /// Column number (1-based)
        #[arg(long, short)]
        column: usize,
    },

    /// Get suggestions at position
    Complete {
        /// Path to document
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long, short)]
        line: usize,

        /// Column number (1-based)
        #[arg(long, short)]
        column: usize,

        /// Confirm a suggestion by key (repeatable)
        #[arg(long)]
        select: Vec<String>,
    },

    /// Validate field values
    Validate {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// File name glob for directory walks
        #[arg(long, default_value = "*.md")]
        include: String,
    },

    /// List configured rules
    Rules,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default(Path::new(".")),
    };

    let mut engine = Engine::new(config);

    match cli.command {
        Commands::Context { file, line, column } => {
            let source = read_source(&file)?;
            let ctx = engine.context(&source, line.saturating_sub(1), column.saturating_sub(1));

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&ctx)?);
                }
                OutputFormat::Text => match ctx {
                    Some(ctx) => {
                        println!("Path:      {}", ctx.path);
                        println!("Depth:     {}", ctx.depth());
                        println!("Line kind: {:?}", ctx.kind);
                        println!("Indent:    {}", ctx.indent);
                        println!("Key line:  {}", ctx.key_line + 1);
                        if !ctx.query.is_empty() {
                            println!("Query:     {}", ctx.query);
                        }
                        if let Some(value) = &ctx.value {
                            let rendered = serde_yaml::to_string(value)?;
                            println!("Value:     {}", rendered.trim_end());
                        }
                    }
                    None => println!("Not inside a frontmatter field"),
                },
            }
        }

        Commands::Complete {
            file,
            line,
            column,
            select,
        } => {
            let source = read_source(&file)?;
            let suggestions =
                engine.suggest(&source, line.saturating_sub(1), column.saturating_sub(1));

            if select.is_empty() {
                print_suggestions(suggestions.as_ref(), cli.format)?;
                return Ok(());
            }

            let Some(suggestions) = suggestions else {
                anyhow::bail!("No suggestions at {}:{}:{}", file.display(), line, column);
            };

            let insertions = run_selection(&engine, &file, &suggestions, &select)?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&insertions)?);
                }
                OutputFormat::Text => {
                    for insertion in &insertions {
                        println!(
                            "Insert {} at {}:{}-{}:{}, cursor {}:{}",
                            insertion.keys.join(", "),
                            insertion.start.line + 1,
                            insertion.start.column + 1,
                            insertion.end.line + 1,
                            insertion.end.column + 1,
                            insertion.cursor.line + 1,
                            insertion.cursor.column + 1,
                        );
                    }
                    if let [insertion] = insertions.as_slice() {
                        println!();
                        print!("{}", insertion.apply(&source));
                    }
                }
            }
        }

        Commands::Validate { paths, include } => {
            let pattern = glob::Pattern::new(&include)
                .with_context(|| format!("Invalid include pattern '{}'", include))?;

            let files = collect_files(&paths, &pattern);
            let mut reports = Vec::new();

            for file in &files {
                let source = read_source(file)?;
                let id = DocumentId::new(file.display().to_string());
                if let Some(report) = engine.validate_document(&id, &source) {
                    reports.push(report);
                }
            }

            let invalid: usize = reports.iter().map(|r| r.diagnostics.len()).sum();

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                }
                OutputFormat::Text => print_reports(&reports, files.len()),
            }

            if invalid > 0 {
                std::process::exit(1);
            }
        }

        Commands::Rules => match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(engine.rules())?);
            }
            OutputFormat::Text => {
                if engine.rules().is_empty() {
                    println!("No rules configured");
                }
                for rule in engine.rules() {
                    let state = if rule.enabled { "" } else { " [disabled]" };
                    let multi = if rule.multi_select { " [multi]" } else { "" };
                    println!(
                        "{:30} {:8} {:3} options{}{}",
                        rule.declared_path(),
                        rule.source.as_str(),
                        rule.options.len(),
                        multi,
                        state
                    );
                }
            }
        },
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Confirm each key in order, closing the session at the end.
/// A single-select rule accepts exactly one key.
fn run_selection(
    engine: &Engine,
    file: &Path,
    suggestions: &Suggestions,
    keys: &[String],
) -> Result<Vec<Insertion>> {
    if suggestions.mode == SelectionMode::Single && keys.len() > 1 {
        anyhow::bail!(
            "'{}' is single-select; pass one --select (got {})",
            suggestions.context.path,
            keys.len()
        );
    }

    let ctx = &suggestions.context;
    let mut session = engine.bind_session(
        SelectionSession::new(),
        DocumentId::new(file.display().to_string()),
        suggestions,
    );
    let mut insertions = Vec::new();

    for key in keys {
        let item = suggestions
            .items
            .iter()
            .find(|item| &item.key == key)
            .with_context(|| format!("'{}' is not among the suggestions", key))?;

        let (next, insertion) = engine.confirm(session, item, ctx);
        session = next;
        insertions.extend(insertion);
    }

    let (_, insertion) = engine.close(session, ctx);
    insertions.extend(insertion);

    Ok(insertions)
}

fn collect_files(paths: &[PathBuf], pattern: &glob::Pattern) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let matches = entry
                .file_name()
                .to_str()
                .map_or(false, |name| pattern.matches(name));
            if entry.file_type().is_file() && matches {
                files.push(entry.into_path());
            }
        }
    }

    files
}

fn print_suggestions(suggestions: Option<&Suggestions>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }
        OutputFormat::Text => match suggestions {
            Some(s) if !s.items.is_empty() => {
                println!("Suggestions for {} ({}):", s.context.path, s.items.len());
                let session = SelectionSession::new();
                for item in &s.items {
                    println!("  {:20} {}", item.key, session.render(item));
                }
            }
            _ => println!("No suggestions found"),
        },
    }
    Ok(())
}

fn print_reports(reports: &[ValidationReport], files: usize) {
    let mut invalid = 0;

    for report in reports {
        for diag in &report.diagnostics {
            invalid += 1;
            println!(
                "{}:{}:{}: {} '{}' at {} ({})",
                report.document,
                diag.line + 1,
                diag.start + 1,
                diag.error,
                diag.value,
                diag.path,
                diag.suggestion
            );
        }
    }

    let checked: usize = reports.iter().map(|r| r.checked).sum();
    println!();
    println!(
        "{} file(s), {} value(s) checked, {} invalid",
        files, checked, invalid
    );
}
