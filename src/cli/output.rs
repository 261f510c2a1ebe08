//! Handles all user-facing output for the CLI.
//!
//! Diagnostics, token streams and trees are written to any [`WriteColor`], so the same
//! code drives the terminal and the in-memory buffers used by tests.

use std::io;

use miette::{GraphicalReportHandler, GraphicalTheme};
use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::config::OutputFormat;
use crate::diagnostics::{Diagnostic, Severity};
use crate::errors::BtreeError;
use crate::source::SourceFile;
use crate::syntax::{ParseOutput, Token};
use crate::validation::Validator;

// ============================================================================
// DIAGNOSTIC REPORTS
// ============================================================================

/// A diagnostic tagged with the source it belongs to, as written in JSON output.
#[derive(Debug, Serialize)]
struct SourcedDiagnostic<'a> {
    source: &'a str,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

/// Accumulates the diagnostics of a `check` run and writes them in one format.
///
/// Human and short output is written as each source is added; JSON is buffered and
/// written as a single array by [`Report::finish`].
pub struct Report {
    format: OutputFormat,
    json: Vec<serde_json::Value>,
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl Report {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            json: Vec::new(),
            files: 0,
            errors: 0,
            warnings: 0,
        }
    }

    pub fn add<'a>(
        &mut self,
        out: &mut dyn WriteColor,
        source: &SourceFile,
        diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
    ) -> Result<(), BtreeError> {
        self.files += 1;
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
            }
            match self.format {
                OutputFormat::Human => write_human(out, source, diagnostic)?,
                OutputFormat::Short => write_short(out, &source.name, diagnostic)?,
                OutputFormat::Json => self.json.push(serde_json::to_value(SourcedDiagnostic {
                    source: &source.name,
                    diagnostic,
                })?),
            }
        }
        Ok(())
    }

    pub fn finish(&mut self, out: &mut dyn WriteColor) -> Result<(), BtreeError> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *out, &self.json)?;
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Writes `name:line:column: severity: message`, with the severity colored.
pub fn write_short(
    out: &mut dyn WriteColor,
    name: &str,
    diagnostic: &Diagnostic,
) -> io::Result<()> {
    write!(out, "{}:{}:{}: ", name, diagnostic.line, diagnostic.column)?;
    out.set_color(&severity_color(diagnostic.severity))?;
    write!(out, "{}", diagnostic.severity)?;
    out.reset()?;
    writeln!(out, ": {}", diagnostic.message)
}

/// Writes a miette report with a snippet of the offending line.
pub fn write_human(
    out: &mut dyn WriteColor,
    source: &SourceFile,
    diagnostic: &Diagnostic,
) -> io::Result<()> {
    let theme = if out.supports_color() {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let mut rendered = String::new();
    GraphicalReportHandler::new_themed(theme)
        .render_report(&mut rendered, &diagnostic.to_report(source))
        .map_err(io::Error::other)?;
    write!(out, "{}", rendered)
}

/// Writes a one-line run summary.
pub fn write_summary(out: &mut dyn WriteColor, report: &Report) -> io::Result<()> {
    let style = if report.has_errors() {
        severity_color(Severity::Error)
    } else {
        ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true).clone()
    };
    out.set_color(&style)?;
    write!(out, "checked {} file(s)", report.files)?;
    out.reset()?;
    writeln!(
        out,
        ": {} error(s), {} warning(s)",
        report.errors, report.warnings
    )
}

// ============================================================================
// TOKENS AND TREES
// ============================================================================

pub fn write_tokens(
    out: &mut dyn WriteColor,
    tokens: &[Token],
    json: bool,
) -> Result<(), BtreeError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, tokens)?;
        writeln!(out)?;
        return Ok(());
    }
    for token in tokens {
        writeln!(out, "{}", token)?;
    }
    Ok(())
}

pub fn write_tree(
    out: &mut dyn WriteColor,
    output: &ParseOutput,
    json: bool,
) -> Result<(), BtreeError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, output)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", output)?;
    }
    Ok(())
}

/// Writes one `id  description` line per rule, ids bold.
pub fn write_rules(out: &mut dyn WriteColor, validator: &Validator) -> io::Result<()> {
    let width = validator.rule_ids().iter().map(|id| id.len()).max().unwrap_or(0);
    for rule in validator.rules() {
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, "{:width$}", rule.id(), width = width)?;
        out.reset()?;
        writeln!(out, "  {}", rule.description())?;
    }
    Ok(())
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn severity_color(severity: Severity) -> ColorSpec {
    let color = match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    };
    ColorSpec::new().set_fg(Some(color)).set_bold(true).clone()
}
