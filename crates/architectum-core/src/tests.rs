//! Pipeline-level tests for architectum-core

use std::fs;

use crate::test_utils::{create_structure_tree, sample_document};
use crate::*;

#[test]
fn test_extracted_document_layout() {
    insta::assert_snapshot!(sample_document().to_canonical_xml(), @r#"
    <?xml version="1.0" encoding="utf-8"?>
    <Application name="auto_extracted" domain="python">
      <Component name="shapes" description="Extracted from Python module">
        <Type name="Shape" kind="object">
          <Property name="sides" type="int" required="true"/>
        </Type>
        <Function name="area" method="N/A" path="N/A">
          <Description>Function area extracted from shapes.py</Description>
          <Returns type="Shape" reference=""/>
          <Calls/>
          <CalledBy/>
        </Function>
        <Function name="perimeter" method="N/A" path="N/A">
          <Description>Function perimeter extracted from shapes.py</Description>
          <Returns type="unknown" reference=""/>
          <Calls/>
          <CalledBy/>
        </Function>
      </Component>
    </Application>
    "#);
}

#[test]
fn test_single_document_index_diffs_clean_against_itself() {
    let temp = tempfile::TempDir::new().unwrap();
    let folder = temp.path().join("shapes");
    store::write_document(&sample_document(), &folder.join("shapes.xml")).unwrap();

    let plan = Plan::from_yaml_str(
        "xml_groups:\n  geometry: [shapes]\n",
        std::path::Path::new("plan.yaml"),
    )
    .unwrap();
    let report = build_indexes(&RunContext::silent(), &plan, temp.path(), temp.path());
    assert_eq!(report.succeeded(), 1);

    let index = temp.path().join("geometry_index.xml");
    let diff = diff_index_files(&index, &index).unwrap();
    assert_eq!(diff.to_string(), NO_DIFFERENCES);

    // The merged component is still a valid structural document.
    let doc = store::read_document(&index).unwrap();
    assert_eq!(doc.domain, "composite");
    assert_eq!(doc.components, sample_document().components);
}

#[test]
fn test_rebuilt_index_diffs_clean_against_previous_copy() {
    let tree = create_structure_tree();
    let plan = Plan::from_yaml_str(
        "xml_groups:\n  core: [core_modules]\n",
        std::path::Path::new("plan.yaml"),
    )
    .unwrap();
    let ctx = RunContext::silent();

    build_indexes(&ctx, &plan, tree.path(), tree.path());
    let previous = tree.path().join("previous_core.xml");
    fs::copy(tree.path().join("core_index.xml"), &previous).unwrap();
    build_indexes(&ctx, &plan, tree.path(), tree.path());

    let diff = diff_index_files(&tree.path().join("core_index.xml"), &previous).unwrap();
    assert!(diff.is_identical());
}

#[test]
fn test_new_component_shows_in_index_diff() {
    let tree = create_structure_tree();
    let plan = Plan::from_yaml_str(
        "xml_groups:\n  core: [core_modules]\n",
        std::path::Path::new("plan.yaml"),
    )
    .unwrap();
    let ctx = RunContext::silent();

    build_indexes(&ctx, &plan, tree.path(), tree.path());
    let previous = tree.path().join("previous_core.xml");
    fs::copy(tree.path().join("core_index.xml"), &previous).unwrap();

    crate::test_utils::write_component_document(
        &tree.path().join("core_modules/delta.xml"),
        &["delta"],
    );
    build_indexes(&ctx, &plan, tree.path(), tree.path());

    match diff_index_files(&tree.path().join("core_index.xml"), &previous).unwrap() {
        IndexDiff::Changed(changes) => {
            assert_eq!(changes.added, 1);
            assert_eq!(changes.removed, 0);
            assert!(changes.unified.contains(r#"+  <Component name="delta""#));
        }
        IndexDiff::Identical => panic!("expected a difference"),
    }
}
