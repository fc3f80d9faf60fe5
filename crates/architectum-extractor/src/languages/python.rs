//! Python language extractor using tree-sitter

use std::path::Path;

use architectum_core::error::Result;
use architectum_core::model::UNKNOWN_TYPE;
use architectum_core::{
    Component, FunctionSignature, Language, Property, TypeDefinition, TypeKind,
};
use tree_sitter::Node;

use crate::extractor::{Fidelity, LanguageExtractor};
use crate::parser::{Grammar, field_text, node_text, parse_source};

pub struct PythonExtractor;

impl PythonExtractor {
    fn extract_function(node: Node, source: &str, path: &Path) -> Option<FunctionSignature> {
        let name = field_text(node, "name", source)?;
        let returns = field_text(node, "return_type", source).unwrap_or(UNKNOWN_TYPE);
        Some(FunctionSignature::extracted("Function", name, returns, path))
    }

    fn extract_class(node: Node, source: &str) -> Option<TypeDefinition> {
        let name = field_text(node, "name", source)?;
        let mut ty = TypeDefinition::new(name, TypeKind::Object);

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for statement in body.named_children(&mut cursor) {
                if let Some(property) = Self::annotated_field(statement, source) {
                    ty.properties.push(property);
                }
            }
        }
        Some(ty)
    }

    /// `name: annotation` or `name: annotation = value` directly in a class body.
    fn annotated_field(statement: Node, source: &str) -> Option<Property> {
        if statement.kind() != "expression_statement" {
            return None;
        }
        let assignment = statement.named_child(0)?;
        if assignment.kind() != "assignment" {
            return None;
        }
        let target = assignment.child_by_field_name("left")?;
        if target.kind() != "identifier" {
            return None;
        }
        let annotation = field_text(assignment, "type", source)?;
        Some(Property::required(node_text(target, source), annotation))
    }
}

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::GrammarAware
    }

    fn extract_component(&self, path: &Path, source: &str) -> Result<Component> {
        let tree = parse_source(Grammar::Python, path, source)?;
        let mut component = Component::for_source(path, Language::Python);

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            // Decorators wrap the definition they apply to.
            let node = match child.kind() {
                "decorated_definition" => match child.child_by_field_name("definition") {
                    Some(definition) => definition,
                    None => continue,
                },
                _ => child,
            };

            match node.kind() {
                "function_definition" => {
                    if let Some(function) = Self::extract_function(node, source, path) {
                        component.push_function(function);
                    }
                }
                "class_definition" => {
                    if let Some(ty) = Self::extract_class(node, source) {
                        component.push_type(ty);
                    }
                }
                _ => {}
            }
        }

        tracing::trace!(
            "{}: {} types, {} functions",
            path.display(),
            component.types().count(),
            component.functions().count()
        );
        Ok(component)
    }
}
