//! Line-pattern extraction for languages without a bundled grammar
//!
//! Each line is tested against a type pattern first and, only if that does
//! not match, against a function pattern. Known blind spots:
//!
//! - signatures spread over several lines are missed or truncated
//! - declarations inside string literals or block comment bodies are reported
//! - nested declarations are reported as if they were top-level
//! - field types are invisible, so types never carry properties

use std::path::Path;

use architectum_core::error::{ArchitectumError, Result};
use architectum_core::model::UNKNOWN_TYPE;
use architectum_core::{Component, FunctionSignature, Language, TypeDefinition, TypeKind};
use regex::Regex;

use crate::extractor::{Fidelity, LanguageExtractor};

/// Static description of one pattern-based language.
#[derive(Debug)]
pub struct PatternRules {
    pub language: Language,
    /// First capture group is the type name.
    pub type_pattern: &'static str,
    pub function_pattern: &'static str,
    pub name_group: usize,
    /// Capture group of the return type. A group that does not participate
    /// yields `unknown`.
    pub return_group: usize,
    /// Verb used in function descriptions.
    pub verb: &'static str,
    /// Lines starting with one of these (after indentation) are skipped.
    pub comment_markers: &'static [&'static str],
    /// Words that disqualify a function match when they appear as its
    /// name or return type.
    pub stopwords: &'static [&'static str],
}

pub struct PatternExtractor {
    rules: &'static PatternRules,
    type_re: Regex,
    function_re: Regex,
}

impl PatternExtractor {
    pub fn new(rules: &'static PatternRules) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                ArchitectumError::Extractor(format!(
                    "invalid {} pattern {pattern:?}: {e}",
                    rules.language
                ))
            })
        };
        Ok(PatternExtractor {
            rules,
            type_re: compile(rules.type_pattern)?,
            function_re: compile(rules.function_pattern)?,
        })
    }

    fn is_comment(&self, line: &str) -> bool {
        let line = line.trim_start();
        self.rules
            .comment_markers
            .iter()
            .any(|marker| line.starts_with(marker))
    }

    fn match_function<'l>(&self, line: &'l str) -> Option<(&'l str, &'l str)> {
        self.function_re.captures_iter(line).find_map(|caps| {
            let name = caps.get(self.rules.name_group)?.as_str();
            let returns = caps
                .get(self.rules.return_group)
                .map_or(UNKNOWN_TYPE, |m| m.as_str());

            let stopped = |word: &str| self.rules.stopwords.contains(&word);
            if stopped(name) || stopped(returns) {
                None
            } else {
                Some((name, returns))
            }
        })
    }
}

impl LanguageExtractor for PatternExtractor {
    fn language(&self) -> Language {
        self.rules.language
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::BestEffort
    }

    fn extract_component(&self, path: &Path, source: &str) -> Result<Component> {
        let mut component = Component::for_source(path, self.rules.language);

        for line in source.lines() {
            if self.is_comment(line) {
                continue;
            }
            if let Some(caps) = self.type_re.captures(line) {
                if let Some(name) = caps.get(1) {
                    component.push_type(TypeDefinition::new(name.as_str(), TypeKind::Object));
                }
                continue;
            }
            if let Some((name, returns)) = self.match_function(line) {
                component.push_function(FunctionSignature::extracted(
                    self.rules.verb,
                    name,
                    returns,
                    path,
                ));
            }
        }

        Ok(component)
    }
}
