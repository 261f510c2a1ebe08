//! Rule: Attribute Fields
//!
//! For tasks and guards bound to an import whose class is known to the field reflector,
//! every attribute must name a declared field and every required field must be given.
//! Unknown attributes are warnings; missing required attributes are errors.

use super::ValidationRule;
use crate::ast::{ImportMap, TaskTree};
use crate::diagnostics::{Diagnostic, Phase, Severity};
use crate::reflect::FieldReflector;

pub struct AttributeFieldsRule<R> {
    reflector: R,
}

impl<R: FieldReflector> AttributeFieldsRule<R> {
    pub fn new(reflector: R) -> Self {
        Self { reflector }
    }
}

impl<R: FieldReflector> ValidationRule for AttributeFieldsRule<R> {
    fn id(&self) -> &'static str {
        "attribute-fields"
    }

    fn description(&self) -> &'static str {
        "Attributes must match the declared fields of the imported class"
    }

    fn validate(&self, tree: &TaskTree, imports: &ImportMap) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for id in tree.breadth_first() {
            let node = tree.node(id);
            let Some(class_path) = imports.get(&node.name) else {
                continue;
            };
            let Some(fields) = self.reflector.fields(class_path) else {
                continue;
            };

            for attr in node.attributes.keys() {
                if !fields.iter().any(|field| &field.name == attr) {
                    diagnostics.push(
                        Diagnostic::at_token(
                            Phase::Semantic,
                            format!("unknown attribute \"{}\" for \"{}\".", attr, node.name),
                            &node.token,
                        )
                        .with_severity(Severity::Warning),
                    );
                }
            }

            for field in fields.iter().filter(|field| field.required) {
                if !node.attributes.contains_key(&field.name) {
                    diagnostics.push(Diagnostic::at_token(
                        Phase::Semantic,
                        format!(
                            "missing required attribute \"{}\" for \"{}\".",
                            field.name, node.name
                        ),
                        &node.token,
                    ));
                }
            }
        }

        diagnostics
    }
}
