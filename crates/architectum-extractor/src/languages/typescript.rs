//! TypeScript language extractor using tree-sitter

use std::path::Path;

use architectum_core::error::Result;
use architectum_core::model::UNKNOWN_TYPE;
use architectum_core::{
    Component, FunctionSignature, Language, Property, TypeDefinition, TypeKind,
};
use tree_sitter::Node;

use crate::extractor::{Fidelity, LanguageExtractor};
use crate::parser::{Grammar, field_text, node_text, parse_source};

pub struct TypeScriptExtractor;

impl TypeScriptExtractor {
    fn extract_function(node: Node, source: &str, path: &Path) -> Option<FunctionSignature> {
        let name = field_text(node, "name", source)?;
        let returns = node
            .child_by_field_name("return_type")
            .map(|annotation| annotation_text(annotation, source))
            .unwrap_or(UNKNOWN_TYPE);
        Some(FunctionSignature::extracted("Function", name, returns, path))
    }

    /// Classes and interfaces, with their typed members as properties.
    fn extract_type(node: Node, source: &str, kind: TypeKind) -> Option<TypeDefinition> {
        let name = field_text(node, "name", source)?;
        let mut ty = TypeDefinition::new(name, kind);

        let member_kind = match kind {
            TypeKind::Object => "public_field_definition",
            TypeKind::Interface => "property_signature",
        };
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                if member.kind() != member_kind {
                    continue;
                }
                let Some(name) = field_text(member, "name", source) else {
                    continue;
                };
                let annotation = member
                    .child_by_field_name("type")
                    .map(|t| annotation_text(t, source))
                    .unwrap_or(UNKNOWN_TYPE);
                ty.properties.push(Property::required(name, annotation));
            }
        }
        Some(ty)
    }
}

/// Type written after the colon of a type annotation.
fn annotation_text<'a>(annotation: Node, source: &'a str) -> &'a str {
    node_text(annotation, source)
        .trim_start()
        .trim_start_matches(':')
        .trim()
}

impl LanguageExtractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::GrammarAware
    }

    fn extract_component(&self, path: &Path, source: &str) -> Result<Component> {
        let tree = parse_source(Grammar::typescript_for(path), path, source)?;
        let mut component = Component::for_source(path, Language::TypeScript);

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let node = match child.kind() {
                "export_statement" => match child.child_by_field_name("declaration") {
                    Some(declaration) => declaration,
                    None => continue,
                },
                _ => child,
            };

            match node.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    if let Some(function) = Self::extract_function(node, source, path) {
                        component.push_function(function);
                    }
                }
                "class_declaration" | "abstract_class_declaration" => {
                    if let Some(ty) = Self::extract_type(node, source, TypeKind::Object) {
                        component.push_type(ty);
                    }
                }
                "interface_declaration" => {
                    if let Some(ty) = Self::extract_type(node, source, TypeKind::Interface) {
                        component.push_type(ty);
                    }
                }
                _ => {}
            }
        }

        Ok(component)
    }
}
