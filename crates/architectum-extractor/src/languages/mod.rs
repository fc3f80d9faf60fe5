//! Language extractors and the table that selects them

pub mod dart;
pub mod kotlin;
pub mod pattern;
pub mod python;
pub mod typescript;

use std::path::Path;

use architectum_core::Language;
use architectum_core::error::{ArchitectumError, Result};

use crate::extractor::LanguageExtractor;
use pattern::PatternExtractor;
use python::PythonExtractor;
use typescript::TypeScriptExtractor;

/// One row of the extractor table.
pub struct ExtractorEntry {
    pub language: Language,
    pub build: fn() -> Result<Box<dyn LanguageExtractor>>,
}

/// Every registered extractor, one per [`Language`].
pub static REGISTRY: &[ExtractorEntry] = &[
    ExtractorEntry {
        language: Language::Python,
        build: build_python,
    },
    ExtractorEntry {
        language: Language::TypeScript,
        build: build_typescript,
    },
    ExtractorEntry {
        language: Language::Kotlin,
        build: build_kotlin,
    },
    ExtractorEntry {
        language: Language::Flutter,
        build: build_dart,
    },
];

fn build_python() -> Result<Box<dyn LanguageExtractor>> {
    Ok(Box::new(PythonExtractor))
}

fn build_typescript() -> Result<Box<dyn LanguageExtractor>> {
    Ok(Box::new(TypeScriptExtractor))
}

fn build_kotlin() -> Result<Box<dyn LanguageExtractor>> {
    Ok(Box::new(PatternExtractor::new(&kotlin::RULES)?))
}

fn build_dart() -> Result<Box<dyn LanguageExtractor>> {
    Ok(Box::new(PatternExtractor::new(&dart::RULES)?))
}

/// Build the extractor registered for `language`.
pub fn extractor_for(language: Language) -> Result<Box<dyn LanguageExtractor>> {
    let entry = REGISTRY
        .iter()
        .find(|entry| entry.language == language)
        .ok_or_else(|| ArchitectumError::Extractor(format!("no extractor registered for {language}")))?;
    (entry.build)()
}

/// Get the appropriate extractor for a file based on its extension.
pub fn extractor_for_path(path: &Path) -> Option<Result<Box<dyn LanguageExtractor>>> {
    Language::from_path(path).map(extractor_for)
}
