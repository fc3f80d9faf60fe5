//! Test utilities for Architectum

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::document::XmlElement;
use crate::model::{
    Component, FunctionSignature, Language, Property, StructuralDocument, TypeDefinition,
    TypeKind, UNKNOWN_TYPE,
};
use crate::store;

/// Write an extracted-style document holding one empty component per name.
pub fn write_component_document(path: &Path, components: &[&str]) {
    let mut root = XmlElement::new("Application")
        .with_attr("name", "auto_extracted")
        .with_attr("domain", "python");
    for name in components {
        root.push(
            XmlElement::new("Component")
                .with_attr("name", *name)
                .with_attr("description", "Extracted from Python module"),
        );
    }
    store::write_element(&root, path).unwrap();
}

/// Create a structure directory with one plan folder:
///
/// ```text
/// core_modules/alpha.xml   components alpha_one, alpha_two
/// core_modules/beta.xml    component beta
/// core_modules/gamma.xml   no components
/// ```
pub fn create_structure_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let folder = temp_dir.path().join("core_modules");
    fs::create_dir_all(&folder).unwrap();

    write_component_document(&folder.join("alpha.xml"), &["alpha_one", "alpha_two"]);
    write_component_document(&folder.join("beta.xml"), &["beta"]);
    write_component_document(&folder.join("gamma.xml"), &[]);

    temp_dir
}

/// A small extracted document: `Shape` with one field and `area` returning it.
pub fn sample_document() -> StructuralDocument {
    let source = Path::new("shapes.py");
    let mut component = Component::for_source(source, Language::Python);

    let mut shape = TypeDefinition::new("Shape", TypeKind::Object);
    shape.properties.push(Property::required("sides", "int"));
    component.push_type(shape);
    component.push_function(FunctionSignature::extracted("Function", "area", "Shape", source));
    component.push_function(FunctionSignature::extracted(
        "Function",
        "perimeter",
        UNKNOWN_TYPE,
        source,
    ));

    StructuralDocument::extracted(Language::Python, component)
}
