//! Structural schema: documents, components, types and functions

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::document::XmlElement;
use crate::error::{ArchitectumError, Result};

/// Application name carried by every extractor-produced document.
pub const EXTRACTED_NAME: &str = "auto_extracted";

/// Domain label of aggregated documents.
pub const COMPOSITE_DOMAIN: &str = "composite";

/// Placeholder used for the reserved `method`/`path` call-site attributes.
pub const NOT_APPLICABLE: &str = "N/A";

/// Type name used when a declaration carries no resolvable annotation.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Source languages with a registered extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    TypeScript,
    Kotlin,
    /// Flutter projects; the source language is Dart.
    Flutter,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::TypeScript,
        Language::Kotlin,
        Language::Flutter,
    ];

    /// Domain label written on the documents this language produces.
    pub fn domain(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::Kotlin => "kotlin",
            Language::Flutter => "flutter",
        }
    }

    /// File extensions (without the dot) handled by this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::TypeScript => &["ts", "tsx"],
            Language::Kotlin => &["kt", "kts"],
            Language::Flutter => &["dart"],
        }
    }

    /// Human label used in component descriptions.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::TypeScript => "TypeScript",
            Language::Kotlin => "Kotlin",
            Language::Flutter => "Flutter (Dart)",
        }
    }

    /// Detect language from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Language::ALL
            .into_iter()
            .find(|language| language.extensions().contains(&ext))
    }

    /// Whether `path` carries one of this language's extensions.
    pub fn matches_path(&self, path: &Path) -> bool {
        Language::from_path(path) == Some(*self)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.domain())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "kotlin" | "kt" => Ok(Language::Kotlin),
            "flutter" | "dart" => Ok(Language::Flutter),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// Root record produced by one extraction or aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralDocument {
    pub name: String,
    pub domain: String,
    pub components: Vec<Component>,
}

impl StructuralDocument {
    /// Document emitted by an extractor for a single source file.
    pub fn extracted(language: Language, component: Component) -> Self {
        StructuralDocument {
            name: EXTRACTED_NAME.to_string(),
            domain: language.domain().to_string(),
            components: vec![component],
        }
    }

    pub fn type_count(&self) -> usize {
        self.components.iter().map(|c| c.types().count()).sum()
    }

    pub fn function_count(&self) -> usize {
        self.components.iter().map(|c| c.functions().count()).sum()
    }

    /// Parse a serialized structural document.
    pub fn from_xml_str(source: &str) -> Result<Self> {
        let root = XmlElement::parse(source)?;
        StructuralDocument::try_from(&root)
    }

    /// Canonical XML serialization.
    pub fn to_canonical_xml(&self) -> String {
        XmlElement::from(self).to_canonical_string()
    }
}

/// Structural representation of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub description: String,
    /// Types and functions in declaration order.
    pub members: Vec<Member>,
}

impl Component {
    /// Component for the source file at `path`, named after its stem.
    pub fn for_source(path: &Path, language: Language) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Component {
            name,
            description: format!("Extracted from {} module", language.display_name()),
            members: Vec::new(),
        }
    }

    pub fn push_type(&mut self, ty: TypeDefinition) {
        self.members.push(Member::Type(ty));
    }

    pub fn push_function(&mut self, function: FunctionSignature) {
        self.members.push(Member::Function(function));
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.members.iter().filter_map(|m| match m {
            Member::Type(ty) => Some(ty),
            Member::Function(_) => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.members.iter().filter_map(|m| match m {
            Member::Function(function) => Some(function),
            Member::Type(_) => None,
        })
    }
}

/// A child of a component. Types and functions share one ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Type(TypeDefinition),
    Function(FunctionSignature),
}

/// Kind attribute of a type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Classes and other record-like declarations.
    Object,
    Interface,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Object => "object",
            TypeKind::Interface => "interface",
        }
    }
}

impl FromStr for TypeKind {
    type Err = ArchitectumError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "object" => Ok(TypeKind::Object),
            "interface" => Ok(TypeKind::Interface),
            other => Err(ArchitectumError::Schema(format!("unknown type kind '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub properties: Vec<Property>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        TypeDefinition {
            name: name.into(),
            kind,
            properties: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    /// Declared type, `"unknown"` when unresolved.
    pub ty: String,
    pub required: bool,
}

impl Property {
    /// Extractors never infer optionality.
    pub fn required(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Property {
            name: name.into(),
            ty: ty.into(),
            required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub method: String,
    pub path: String,
    pub description: String,
    pub returns: Returns,
    /// Reserved for call-graph resolution; no extractor fills it.
    pub calls: Vec<CallRef>,
    /// Reserved for call-graph resolution; no extractor fills it.
    pub called_by: Vec<CallRef>,
}

impl FunctionSignature {
    /// Signature as emitted by the extractors: placeholder call-site
    /// attributes, templated description, empty edge containers.
    pub fn extracted(
        verb: &str,
        name: impl Into<String>,
        return_type: impl Into<String>,
        source: &Path,
    ) -> Self {
        let name = name.into();
        let description = format!("{verb} {name} extracted from {}", source.display());
        FunctionSignature {
            name,
            method: NOT_APPLICABLE.to_string(),
            path: NOT_APPLICABLE.to_string(),
            description,
            returns: Returns {
                ty: return_type.into(),
                reference: None,
            },
            calls: Vec::new(),
            called_by: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Returns {
    pub ty: String,
    /// Serialized as an empty attribute when absent.
    pub reference: Option<String>,
}

/// Edge to another function, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRef {
    pub name: String,
}

// ── XML mapping ─────────────────────────────────────────

impl From<&StructuralDocument> for XmlElement {
    fn from(doc: &StructuralDocument) -> Self {
        let mut root = XmlElement::new("Application")
            .with_attr("name", &doc.name)
            .with_attr("domain", &doc.domain);
        for component in &doc.components {
            root.push(XmlElement::from(component));
        }
        root
    }
}

impl From<&Component> for XmlElement {
    fn from(component: &Component) -> Self {
        let mut el = XmlElement::new("Component")
            .with_attr("name", &component.name)
            .with_attr("description", &component.description);
        for member in &component.members {
            match member {
                Member::Type(ty) => el.push(XmlElement::from(ty)),
                Member::Function(function) => el.push(XmlElement::from(function)),
            }
        }
        el
    }
}

impl From<&TypeDefinition> for XmlElement {
    fn from(ty: &TypeDefinition) -> Self {
        let mut el = XmlElement::new("Type")
            .with_attr("name", &ty.name)
            .with_attr("kind", ty.kind.as_str());
        for property in &ty.properties {
            el.push(
                XmlElement::new("Property")
                    .with_attr("name", &property.name)
                    .with_attr("type", &property.ty)
                    .with_attr("required", if property.required { "true" } else { "false" }),
            );
        }
        el
    }
}

impl From<&FunctionSignature> for XmlElement {
    fn from(function: &FunctionSignature) -> Self {
        let edges = |name: &str, refs: &[CallRef]| {
            let mut container = XmlElement::new(name);
            for call in refs {
                container.push(XmlElement::new("Ref").with_attr("name", &call.name));
            }
            container
        };

        let mut el = XmlElement::new("Function")
            .with_attr("name", &function.name)
            .with_attr("method", &function.method)
            .with_attr("path", &function.path);
        el.push(XmlElement::new("Description").with_text(&function.description));
        el.push(
            XmlElement::new("Returns")
                .with_attr("type", &function.returns.ty)
                .with_attr("reference", function.returns.reference.as_deref().unwrap_or("")),
        );
        el.push(edges("Calls", &function.calls));
        el.push(edges("CalledBy", &function.called_by));
        el
    }
}

fn required_attr<'a>(el: &'a XmlElement, key: &str) -> Result<&'a str> {
    el.attr(key).ok_or_else(|| {
        ArchitectumError::Schema(format!("<{}> is missing attribute '{key}'", el.name))
    })
}

fn expect_name(el: &XmlElement, name: &str) -> Result<()> {
    if el.name == name {
        Ok(())
    } else {
        Err(ArchitectumError::Schema(format!(
            "expected <{name}>, found <{}>",
            el.name
        )))
    }
}

impl TryFrom<&XmlElement> for StructuralDocument {
    type Error = ArchitectumError;

    fn try_from(el: &XmlElement) -> Result<Self> {
        expect_name(el, "Application")?;
        let components = el
            .children_named("Component")
            .map(Component::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(StructuralDocument {
            name: required_attr(el, "name")?.to_string(),
            domain: required_attr(el, "domain")?.to_string(),
            components,
        })
    }
}

impl TryFrom<&XmlElement> for Component {
    type Error = ArchitectumError;

    fn try_from(el: &XmlElement) -> Result<Self> {
        expect_name(el, "Component")?;
        let mut members = Vec::new();
        for child in &el.children {
            match child.name.as_str() {
                "Type" => members.push(Member::Type(TypeDefinition::try_from(child)?)),
                "Function" => members.push(Member::Function(FunctionSignature::try_from(child)?)),
                other => {
                    return Err(ArchitectumError::Schema(format!(
                        "unexpected <{other}> inside <Component>"
                    )));
                }
            }
        }
        Ok(Component {
            name: required_attr(el, "name")?.to_string(),
            description: el.attr("description").unwrap_or_default().to_string(),
            members,
        })
    }
}

impl TryFrom<&XmlElement> for TypeDefinition {
    type Error = ArchitectumError;

    fn try_from(el: &XmlElement) -> Result<Self> {
        expect_name(el, "Type")?;
        let properties = el
            .children_named("Property")
            .map(|p| {
                Ok(Property {
                    name: required_attr(p, "name")?.to_string(),
                    ty: p.attr("type").unwrap_or(UNKNOWN_TYPE).to_string(),
                    required: p.attr("required") != Some("false"),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TypeDefinition {
            name: required_attr(el, "name")?.to_string(),
            kind: required_attr(el, "kind")?.parse()?,
            properties,
        })
    }
}

impl TryFrom<&XmlElement> for FunctionSignature {
    type Error = ArchitectumError;

    fn try_from(el: &XmlElement) -> Result<Self> {
        expect_name(el, "Function")?;
        let refs = |container: &str| -> Result<Vec<CallRef>> {
            el.children_named(container)
                .flat_map(|c| c.children_named("Ref"))
                .map(|r| {
                    Ok(CallRef {
                        name: required_attr(r, "name")?.to_string(),
                    })
                })
                .collect()
        };
        let returns = el.children_named("Returns").next();
        Ok(FunctionSignature {
            name: required_attr(el, "name")?.to_string(),
            method: el.attr("method").unwrap_or(NOT_APPLICABLE).to_string(),
            path: el.attr("path").unwrap_or(NOT_APPLICABLE).to_string(),
            description: el
                .children_named("Description")
                .next()
                .and_then(|d| d.text.clone())
                .unwrap_or_default(),
            returns: Returns {
                ty: returns
                    .and_then(|r| r.attr("type"))
                    .unwrap_or(UNKNOWN_TYPE)
                    .to_string(),
                reference: returns
                    .and_then(|r| r.attr("reference"))
                    .filter(|r| !r.is_empty())
                    .map(str::to_string),
            },
            calls: refs("Calls")?,
            called_by: refs("CalledBy")?,
        })
    }
}
