//! Syntax module for btree scripts
//!
//! Holds the token model, the indentation-aware lexer and the recursive descent parser.
//! The lexer and parser never fail outright: problems are pushed into a
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink) and both stages keep going.

use serde::{Deserialize, Serialize};

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use parser::{parse, ParseOutput, Parser};
pub use token::{Token, TokenKind};

/// Represents a byte span in the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes, never less than one so that empty spans still get a caret.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start).max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}
