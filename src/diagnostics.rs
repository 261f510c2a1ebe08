//! Unified diagnostics for the btree pipeline.
//!
//! Every problem found by the lexer, the parser or the validator is a [`Diagnostic`]:
//! a phase, a severity, a message and the line/column of the offending token. Stages
//! report through the [`DiagnosticSink`] trait at the point of detection, so a caller can
//! collect, stream or drop them as it likes.
//!
//! For presentation a diagnostic is paired with its [`SourceFile`] in a
//! [`DiagnosticReport`], which implements [`miette::Diagnostic`] and renders a labelled
//! snippet of the offending line.

use std::fmt;
use std::sync::Arc;

use miette::{LabeledSpan, NamedSource, SourceCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::SourceFile;
use crate::syntax::{Span, Token};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lex,
    Parse,
    Semantic,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lex => "lex",
            Phase::Parse => "parse",
            Phase::Semantic => "semantic",
        }
    }
}

/// Severity of a diagnostic. Everything the core reports is an error; warnings only come
/// from optional checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single positioned problem report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(
        phase: Phase,
        message: impl Into<String>,
        line: usize,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            phase,
            severity: Severity::Error,
            message: message.into(),
            line,
            column,
            span,
        }
    }

    /// An error positioned at `token`.
    pub fn at_token(phase: Phase, message: impl Into<String>, token: &Token) -> Self {
        Self::error(phase, message, token.line, token.column, token.span)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Displays as `name:line:column: severity: message`.
    pub fn located<'a>(&'a self, name: &'a str) -> Located<'a> {
        Located {
            diagnostic: self,
            name,
        }
    }

    /// Pairs the diagnostic with its source for rich rendering.
    pub fn to_report(&self, source: &SourceFile) -> DiagnosticReport {
        DiagnosticReport {
            diagnostic: self.clone(),
            named_source: source.to_named_source(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.line, self.column, self.severity, self.message
        )
    }
}

/// A diagnostic bound to the identifier of the source it came from.
pub struct Located<'a> {
    diagnostic: &'a Diagnostic,
    name: &'a str,
}

impl fmt::Display for Located<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.diagnostic)
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Receiver for diagnostics as they are detected.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Ordered collection of diagnostics. Every emitted diagnostic is also logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }
}

impl DiagnosticSink for Diagnostics {
    fn emit(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            phase = diagnostic.phase.as_str(),
            line = diagnostic.line,
            column = diagnostic.column,
            "{}",
            diagnostic.message
        );
        self.items.push(diagnostic);
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diagnostic in iter {
            self.emit(diagnostic);
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ============================================================================
// RICH RENDERING
// ============================================================================

/// A diagnostic together with its named source, renderable through miette.
#[derive(Debug, Error)]
#[error("{}", diagnostic.message)]
pub struct DiagnosticReport {
    diagnostic: Diagnostic,
    named_source: Arc<NamedSource<String>>,
}

impl DiagnosticReport {
    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }
}

impl miette::Diagnostic for DiagnosticReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("btree::{}", self.diagnostic.phase.as_str())))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diagnostic.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(self.named_source.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.diagnostic.span;
        let label = LabeledSpan::new(
            Some(format!(
                "line {}, column {}",
                self.diagnostic.line, self.diagnostic.column
            )),
            span.start,
            span.len(),
        );
        Some(Box::new(std::iter::once(label)))
    }
}
