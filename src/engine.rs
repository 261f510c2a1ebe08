//! The analysis pipeline: lex, parse, then validate one source.
//!
//! Each stage reports into a shared [`Diagnostics`] collector. Parsing always runs, even
//! after lexical errors, so one pass surfaces as many problems as possible; validation
//! runs on whatever tree the parser managed to build.

use crate::ast::{ImportMap, TaskTree};
use crate::config::Config;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::BtreeError;
use crate::source::SourceFile;
use crate::syntax::{parse, tokenize, ParseOutput, Token};
use crate::validation::{AttributeFieldsRule, Validator};

// ============================================================================
// ANALYSIS RESULT
// ============================================================================

/// Everything produced for one source.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub tree: TaskTree,
    pub imports: ImportMap,
    /// Lexical, then parse, then semantic diagnostics, each in detection order.
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.diagnostics.error_count()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Runs sources through lexing, parsing and validation with a fixed rule set.
pub struct Pipeline {
    validator: Validator,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Pipeline with the default validation rules.
    pub fn new() -> Self {
        Self::with_validator(Validator::new())
    }

    pub fn with_validator(validator: Validator) -> Self {
        Self { validator }
    }

    /// Pipeline for a configuration; a field manifest enables the attribute check.
    pub fn from_config(config: &Config) -> Result<Self, BtreeError> {
        let mut validator = Validator::new();
        if let Some(manifest) = config.field_manifest()? {
            validator = validator.with_rule(AttributeFieldsRule::new(manifest));
        }
        tracing::debug!(rules = ?validator.rule_ids(), "built pipeline");
        Ok(Self::with_validator(validator))
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn analyze(&self, source: &SourceFile) -> Analysis {
        let _span = tracing::info_span!("analyze", source = %source.name).entered();

        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(&source.content, &mut diagnostics);
        let ParseOutput { tree, imports } = parse(&tokens, &mut diagnostics);
        diagnostics.extend(self.validator.validate(&tree, &imports));

        tracing::info!(
            tasks = tree.len(),
            imports = imports.len(),
            errors = diagnostics.error_count(),
            "analyzed"
        );
        Analysis {
            tree,
            imports,
            diagnostics,
        }
    }
}

// ============================================================================
// PARTIAL RUNS
// ============================================================================

/// Lex only.
pub fn tokens_of(source: &SourceFile) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let tokens = tokenize(&source.content, &mut diagnostics);
    (tokens, diagnostics)
}

/// Lex and parse, without validation.
pub fn parse_source(source: &SourceFile) -> (ParseOutput, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let tokens = tokenize(&source.content, &mut diagnostics);
    let output = parse(&tokens, &mut diagnostics);
    (output, diagnostics)
}

/// Analyze `content` with the default pipeline.
pub fn analyze_str(name: &str, content: &str) -> Analysis {
    Pipeline::new().analyze(&SourceFile::from_file(name, content))
}
