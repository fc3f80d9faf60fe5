//! Kotlin rules for the pattern extractor

use architectum_core::Language;

use super::pattern::PatternRules;

/// `class Name` / `interface Name`, and `fun name(params): Ret`.
///
/// Generic functions (`fun <T> name`) and extension functions
/// (`fun Type.name`) are not recognised.
pub static RULES: PatternRules = PatternRules {
    language: Language::Kotlin,
    type_pattern: r"\b(?:class|interface)\s+(\w+)",
    function_pattern: r"\bfun\s+(\w+)\s*\((.*?)\)\s*:?\s*(\w+)?",
    name_group: 1,
    return_group: 3,
    verb: "Function",
    comment_markers: &["//", "/*", "*"],
    stopwords: &[],
};

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::extractor::LanguageExtractor;
    use crate::languages::pattern::PatternExtractor;

    use super::*;

    #[test]
    fn test_kotlin_declarations() {
        let extractor = PatternExtractor::new(&RULES).unwrap();
        let source = r#"
package app.users

// fun commentedOut(): Int
/** class NotAType */
data class User(val id: Int, val name: String)

interface Repository

fun loadUser(id: Int): User {
    return User(id, "x")
}

fun log(message: String) {
    println(message)
}

fun <T> generic(value: T): T = value
"#;

        let component = extractor
            .extract_component(Path::new("Users.kt"), source)
            .unwrap();

        let types: Vec<_> = component.types().map(|t| t.name.as_str()).collect();
        assert_eq!(types, vec!["User", "Repository"]);
        assert!(component.types().all(|t| t.properties.is_empty()));

        let functions: Vec<_> = component
            .functions()
            .map(|f| (f.name.as_str(), f.returns.ty.as_str()))
            .collect();
        assert_eq!(functions, vec![("loadUser", "User"), ("log", "unknown")]);
        assert_eq!(component.description, "Extracted from Kotlin module");
    }

    #[test]
    fn test_class_line_is_not_a_function() {
        let extractor = PatternExtractor::new(&RULES).unwrap();
        let component = extractor
            .extract_component(Path::new("A.kt"), "class A { fun inline(): Int = 1 }\n")
            .unwrap();
        assert_eq!(component.types().count(), 1);
        assert_eq!(component.functions().count(), 0);
    }
}
