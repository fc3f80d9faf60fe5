//! Language extractor trait definition

use std::fs;
use std::path::Path;

use architectum_core::error::{ArchitectumError, Result};
use architectum_core::{Component, Language, StructuralDocument};
use serde::Serialize;

/// How much of the source structure an extractor can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fidelity {
    /// Backed by a real grammar; declarations are found from the syntax tree.
    GrammarAware,
    /// Line patterns only. Misses multi-line signatures and can be fooled by
    /// string literals and nested bodies.
    BestEffort,
}

pub trait LanguageExtractor: Send + Sync {
    fn language(&self) -> Language;

    fn fidelity(&self) -> Fidelity;

    /// Extract the component of one source file. `path` is used for naming
    /// and error reporting only.
    fn extract_component(&self, path: &Path, source: &str) -> Result<Component>;

    /// Read `path` and extract its structural document.
    fn parse(&self, path: &Path) -> Result<StructuralDocument> {
        let bytes = fs::read(path).map_err(|e| ArchitectumError::io(path, e))?;
        let source = String::from_utf8(bytes)
            .map_err(|e| ArchitectumError::parse(path, format!("not valid UTF-8: {e}")))?;
        let component = self.extract_component(path, &source)?;
        Ok(StructuralDocument::extracted(self.language(), component))
    }
}
