//! Lexer, parser and validator for tab-indented behavior tree scripts.
//!
//! A script is lexed into [`syntax::Token`]s (with INDENT/DEDENT tokens derived from
//! leading tabs), parsed into an arena-backed [`ast::TaskTree`] plus an import map, and
//! then validated. Every problem is reported as a [`Diagnostic`]; [`Pipeline`] runs all
//! three stages over a [`SourceFile`].

pub use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Phase, Severity};
pub use crate::engine::{Analysis, Pipeline};
pub use crate::errors::BtreeError;
pub use crate::source::SourceFile;

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod reflect;
pub mod source;
pub mod syntax;
pub mod validation;
