//! Tree-sitter parsing for the grammar-aware extractors
//!
//! Tree-sitter parsers are not `Sync`, so each worker thread keeps its own
//! parser and switches grammar per request.

use std::cell::RefCell;
use std::path::Path;

use architectum_core::error::{ArchitectumError, Result};
use tree_sitter::{Language, Node, Parser, Tree};

/// Grammars bundled with the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    Python,
    TypeScript,
    Tsx,
}

impl Grammar {
    pub fn language(&self) -> Language {
        match self {
            Grammar::Python => tree_sitter_python::LANGUAGE.into(),
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// TypeScript grammar variant for `path`.
    pub fn typescript_for(path: &Path) -> Grammar {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") => Grammar::Tsx,
            _ => Grammar::TypeScript,
        }
    }
}

thread_local! {
    static PARSER: RefCell<Parser> = RefCell::new(Parser::new());
}

/// Parse `source` with `grammar`.
///
/// A tree containing error or missing nodes is rejected with the position of
/// the first one.
pub fn parse_source(grammar: Grammar, path: &Path, source: &str) -> Result<Tree> {
    let tree = PARSER.with(|parser| {
        let mut parser = parser.borrow_mut();
        parser
            .set_language(&grammar.language())
            .map_err(|e| ArchitectumError::Extractor(format!("failed to load {grammar:?} grammar: {e}")))?;
        parser
            .parse(source, None)
            .ok_or_else(|| ArchitectumError::parse(path, "parser returned no tree"))
    })?;

    let root = tree.root_node();
    if root.has_error() {
        let message = match first_error(root) {
            Some(node) => {
                let pos = node.start_position();
                let what = if node.is_missing() {
                    format!("missing {}", node.kind())
                } else {
                    "syntax error".to_string()
                };
                format!("{what} at line {}, column {}", pos.row + 1, pos.column + 1)
            }
            None => "syntax error".to_string(),
        };
        return Err(ArchitectumError::parse(path, message));
    }

    Ok(tree)
}

/// Depth-first search for the first error or missing node.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Source text covered by `node`.
pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// Text of the child in `field`, if present.
pub fn field_text<'a>(node: Node<'_>, field: &str, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| node_text(n, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python() {
        let tree = parse_source(Grammar::Python, Path::new("a.py"), "def f():\n    pass\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
    }

    #[test]
    fn test_parse_tsx() {
        let source = "export const View = () => <div>{name}</div>;\n";
        let tree = parse_source(Grammar::Tsx, Path::new("view.tsx"), source).unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = parse_source(Grammar::Python, Path::new("bad.py"), "def broken(:\n    pass\n")
            .unwrap_err();
        match err {
            ArchitectumError::Parse { path, message } => {
                assert_eq!(path, Path::new("bad.py"));
                assert!(message.contains("line 1"), "unexpected message: {}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_grammar_for_extension() {
        assert_eq!(Grammar::typescript_for(Path::new("a.tsx")), Grammar::Tsx);
        assert_eq!(Grammar::typescript_for(Path::new("a.ts")), Grammar::TypeScript);
    }
}
