//! Dart rules for the pattern extractor, used for Flutter projects

use architectum_core::Language;

use super::pattern::PatternRules;

/// Statements that look like `Word name(...)` without declaring anything.
const CONTROL_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "new", "await", "else", "throw", "yield",
    "case", "assert", "const", "final", "var", "in", "is", "as", "super", "this",
];

/// `class Name`, and `Ret name(params)` where `Ret` may be generic or nullable.
pub static RULES: PatternRules = PatternRules {
    language: Language::Flutter,
    type_pattern: r"\bclass\s+(\w+)",
    function_pattern: r"(\w+(?:<[\w\s,<>?]*>)?\??)\s+(\w+)\s*\(([^)]*)\)",
    name_group: 2,
    return_group: 1,
    verb: "Method",
    comment_markers: &["//", "/*", "*"],
    stopwords: CONTROL_WORDS,
};
