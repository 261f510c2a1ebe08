//! Semantic validation of a parsed tree.
//!
//! Validation runs once the whole tree exists and works only on the tree and the import
//! map, never on raw text. Checks are [`ValidationRule`]s collected in a [`Validator`];
//! the default validator carries the undefined-identifier check.
//!
//! ```rust
//! use btree::syntax::{parse, tokenize};
//! use btree::validation::validate;
//!
//! let mut diagnostics = Vec::new();
//! let tokens = tokenize("root\n\tfrobnicate\n", &mut diagnostics);
//! let output = parse(&tokens, &mut diagnostics);
//! let errors = validate(&output.tree, &output.imports);
//! assert_eq!(errors[0].message, "\"frobnicate\" is not defined.");
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::ast::{ImportMap, TaskTree};
use crate::diagnostics::Diagnostic;

pub mod attributes;
pub mod undefined;

pub use attributes::AttributeFieldsRule;
pub use undefined::UndefinedIdentifierRule;

/// Node kinds that resolve without an import.
pub const BUILT_IN_IDENTS: [&str; 15] = [
    "include",
    "root",
    "selector",
    "randomSelector",
    "sequence",
    "randomSequence",
    "parallel",
    "dynamicGuardSelector",
    "alwaysFail",
    "alwaysSucceed",
    "invert",
    "repeat",
    "semaphoreGuard",
    "untilFail",
    "untilSuccess",
];

static BUILT_INS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| BUILT_IN_IDENTS.iter().copied().collect());

pub fn is_built_in(name: &str) -> bool {
    BUILT_INS.contains(name)
}

/// A single semantic check.
pub trait ValidationRule: Send + Sync {
    /// Short kebab-case identifier.
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn validate(&self, tree: &TaskTree, imports: &ImportMap) -> Vec<Diagnostic>;
}

/// Ordered set of rules run over a tree.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator with the default rules.
    pub fn new() -> Self {
        Self::empty().with_rule(UndefinedIdentifierRule)
    }

    /// Validator with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.register(Box::new(rule));
        self
    }

    pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Registered rules in the order they run.
    pub fn rules(&self) -> impl Iterator<Item = &dyn ValidationRule> + '_ {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    /// Run every rule in registration order and collect their diagnostics.
    pub fn validate(&self, tree: &TaskTree, imports: &ImportMap) -> Vec<Diagnostic> {
        self.rules
            .iter()
            .flat_map(|rule| {
                let found = rule.validate(tree, imports);
                tracing::debug!(rule = rule.id(), diagnostics = found.len(), "ran rule");
                found
            })
            .collect()
    }
}

/// Check `tree` with the default rules.
pub fn validate(tree: &TaskTree, imports: &ImportMap) -> Vec<Diagnostic> {
    Validator::new().validate(tree, imports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_ins_are_recognised() {
        for name in BUILT_IN_IDENTS {
            assert!(is_built_in(name), "{name} should be built in");
        }
        assert!(!is_built_in("import"));
        assert!(!is_built_in("Selector"));
    }

    #[test]
    fn default_validator_has_only_the_undefined_rule() {
        assert_eq!(Validator::new().rule_ids(), vec!["undefined-identifier"]);
        assert!(Validator::empty().rule_ids().is_empty());
    }

    #[test]
    fn rules_describe_themselves() {
        let validator = Validator::new();
        let described: Vec<_> = validator
            .rules()
            .map(|rule| (rule.id(), rule.description()))
            .collect();
        assert_eq!(
            described,
            vec![(
                "undefined-identifier",
                "Task and guard names must be built in or imported"
            )]
        );
    }
}
