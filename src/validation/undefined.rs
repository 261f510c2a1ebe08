//! Rule: Undefined Identifier
//!
//! Every task and guard name must be a built-in node kind or an import alias.
//!
//! ```text
//! import wander:"com.example.Wander"
//!
//! root
//! 	selector
//! 		wander        # ok, imported
//! 		frobnicate    # error: "frobnicate" is not defined.
//! ```
//!
//! `include` is built in; whether the referenced subtree exists is not checked.

use super::{is_built_in, ValidationRule};
use crate::ast::{ImportMap, TaskTree};
use crate::diagnostics::{Diagnostic, Phase};

pub struct UndefinedIdentifierRule;

impl ValidationRule for UndefinedIdentifierRule {
    fn id(&self) -> &'static str {
        "undefined-identifier"
    }

    fn description(&self) -> &'static str {
        "Task and guard names must be built in or imported"
    }

    fn validate(&self, tree: &TaskTree, imports: &ImportMap) -> Vec<Diagnostic> {
        tree.breadth_first()
            .map(|id| tree.node(id))
            .filter(|node| !is_built_in(&node.name) && !imports.contains_key(&node.name))
            .map(|node| {
                Diagnostic::at_token(
                    Phase::Semantic,
                    format!("\"{}\" is not defined.", node.name),
                    &node.token,
                )
            })
            .collect()
    }
}
