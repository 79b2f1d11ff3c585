//! Shared harness for the workspace-level expression tests.
//!
//! Provides a conformance suite that parses expressions in a chosen grammar
//! and compares the canonical output and diagnostics against expectations,
//! plus the tracing setup used when debugging a failing case.
//!
//! Set `TMPLEXPR_LOG` (same syntax as `RUST_LOG`, e.g. `debug` or
//! `tmplexpr_parser=trace`) to see the parser's tracing output.

use std::collections::BTreeMap;
use std::sync::Once;

use miette::{GraphicalReportHandler, GraphicalTheme};
use tmplexpr_core::ExpressionArena;
use tmplexpr_diagnostics::{ErrorCollection, ParserError};
use tmplexpr_parser::{Parser, ParserOptions};
use tmplexpr_printer::serialize_with_source;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a subscriber when `TMPLEXPR_LOG` is set. Safe to call from every test.
pub fn init_tracing() {
    INIT.call_once(|| {
        let Ok(directives) = std::env::var("TMPLEXPR_LOG") else {
            return;
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::builder().parse_lossy(directives))
            .with_test_writer()
            .try_init();
    });
}

/// Which grammar a case is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Action,
    Binding,
    SimpleBinding,
    Interpolation,
}

/// The canonical text and sorted diagnostics of one parse.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub serialized: String,
    pub errors: Vec<ParserError>,
}

impl ParseOutcome {
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Parse `source` in `mode` with default options.
pub fn parse(mode: Mode, source: &str) -> ParseOutcome {
    parse_with(&Parser::new(ParserOptions::default()), mode, source)
}

pub fn parse_with(parser: &Parser, mode: Mode, source: &str) -> ParseOutcome {
    init_tracing();
    let arena = ExpressionArena::new();
    let result = match mode {
        Mode::Action => parser.parse_action(&arena, source, "conformance", 0),
        Mode::Binding => parser.parse_binding(&arena, source, "conformance", 0),
        Mode::SimpleBinding => parser.parse_simple_binding(&arena, source, "conformance", 0),
        Mode::Interpolation => match parser.parse_interpolation(&arena, source, "conformance", 0) {
            Some(result) => result,
            None => {
                return ParseOutcome {
                    serialized: String::new(),
                    errors: Vec::new(),
                }
            }
        },
    };

    let mut errors = ErrorCollection::new();
    for error in result.errors.iter().cloned() {
        errors.add(error);
    }
    errors.sort();
    ParseOutcome {
        serialized: serialize_with_source(&result),
        errors: errors.into_errors(),
    }
}

/// Render an error the way a terminal report shows it, without colors.
pub fn render_report(error: &ParserError) -> String {
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, error).is_err() {
        return error.to_string();
    }
    out
}

/// What a conformance case expects.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// Parses without errors to this canonical text.
    Clean(&'static str),
    /// Produces an error whose text contains this fragment.
    Error(&'static str),
}

/// Test result for a single conformance case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub category: String,
    pub source: String,
    pub passed: bool,
    pub failure: Option<String>,
}

fn run_case(name: &str, category: &str, mode: Mode, source: &str, expectation: &Expectation) -> CaseResult {
    let outcome = parse(mode, source);
    let failure = match expectation {
        Expectation::Clean(expected) => {
            if !outcome.errors.is_empty() {
                Some(format!("unexpected errors: {:?}", outcome.messages()))
            } else if outcome.serialized != *expected {
                Some(format!("expected `{}`, got `{}`", expected, outcome.serialized))
            } else {
                None
            }
        }
        Expectation::Error(fragment) => {
            if outcome.messages().iter().any(|m| m.contains(fragment)) {
                None
            } else {
                Some(format!("no error containing {:?} in {:?}", fragment, outcome.messages()))
            }
        }
    };
    CaseResult {
        name: name.to_string(),
        category: category.to_string(),
        source: source.to_string(),
        passed: failure.is_none(),
        failure,
    }
}

/// Runs expression cases grouped by category and reports pass rates.
#[derive(Debug, Default)]
pub struct ConformanceSuite {
    results: Vec<CaseResult>,
}

impl ConformanceSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, category: &str, mode: Mode, source: &str, expectation: Expectation) {
        let result = run_case(name, category, mode, source, &expectation);
        self.results.push(result);
    }

    pub fn failures(&self) -> Vec<&CaseResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Pass counts per category, as `(passed, total)`.
    pub fn by_category(&self) -> BTreeMap<&str, (usize, usize)> {
        let mut categories = BTreeMap::new();
        for result in &self.results {
            let entry = categories.entry(result.category.as_str()).or_insert((0, 0));
            if result.passed {
                entry.0 += 1;
            }
            entry.1 += 1;
        }
        categories
    }

    pub fn print_summary(&self) {
        let total = self.results.len();
        let passed = total - self.failures().len();
        println!("\n=== Expression Conformance Summary ===");
        println!("Passed: {}/{}", passed, total);
        for (category, (passed, total)) in self.by_category() {
            println!("  {}: {}/{}", category, passed, total);
        }
        for failure in self.failures() {
            println!(
                "  [{}] {} `{}`: {}",
                failure.category,
                failure.name,
                failure.source,
                failure.failure.as_deref().unwrap_or("unknown failure")
            );
        }
    }
}
