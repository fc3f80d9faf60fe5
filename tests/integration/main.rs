//! Integration tests for Architectum
//!
//! These drive the compiled binary through the extract → build-index →
//! diff-index pipeline in a scratch project directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const PLAN: &str = "xml_groups:\n  core: [core_modules]\n  empty: []\n";

fn architectum(cwd: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_architectum"));
    command.args(args).current_dir(cwd);
    for (key, _) in std::env::vars() {
        if key.starts_with("ARCHITECTUM_") {
            command.env_remove(key);
        }
    }
    command.output().expect("Failed to execute architectum")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// A scratch project with Python sources and a plan in the default locations.
fn create_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "src/shapes.py",
        "class Shape:\n    sides: int\n\ndef area(shape: Shape) -> float:\n    return 0.0\n",
    );
    write(
        root,
        "src/io/loader.py",
        "def load(path: str) -> Shape:\n    pass\n\ndef save():\n    pass\n",
    );
    write(root, "architectum/instructions/plan.yaml", PLAN);
    temp
}

#[test]
fn test_cli_invocation() {
    let temp = TempDir::new().unwrap();

    let help = architectum(temp.path(), &["--help"]);
    assert!(help.status.success());
    assert!(stdout(&help).contains("extract"));
    assert!(stdout(&help).contains("build-index"));
    assert!(stdout(&help).contains("diff-index"));

    let version = architectum(temp.path(), &["--version"]);
    assert!(version.status.success());

    let unknown = architectum(temp.path(), &["explode"]);
    assert_eq!(unknown.status.code(), Some(1));

    let bad_lang = architectum(temp.path(), &["extract", "--lang", "cobol", "."]);
    assert_eq!(bad_lang.status.code(), Some(1));
}

#[test]
fn test_full_pipeline() {
    let project = create_project();
    let root = project.path();

    let extracted = architectum(
        root,
        &["extract", "--lang", "python", "--out", "architectum/structure/core_modules", "src"],
    );
    assert!(extracted.status.success(), "{}", String::from_utf8_lossy(&extracted.stderr));
    assert!(stdout(&extracted).contains("2 written, 0 failed"));

    let structure = root.join("architectum/structure");
    let shapes = fs::read_to_string(structure.join("core_modules/shapes.xml")).unwrap();
    assert!(shapes.starts_with("<?xml"));
    assert!(shapes.contains(r#"<Application name="auto_extracted" domain="python">"#));
    assert!(shapes.contains(r#"<Property name="sides" type="int" required="true"/>"#));
    assert!(shapes.contains(r#"<Returns type="float" reference=""/>"#));

    let built = architectum(root, &["build-index"]);
    assert!(built.status.success(), "{}", String::from_utf8_lossy(&built.stderr));
    assert!(stdout(&built).contains("core_index.xml (2 components)"));
    assert!(stdout(&built).contains("empty_index.xml (0 components)"));

    let index = structure.join("core_index.xml");
    let previous = root.join("previous_core_index.xml");
    fs::copy(&index, &previous).unwrap();

    let same = architectum(
        root,
        &["diff-index", index.to_str().unwrap(), previous.to_str().unwrap()],
    );
    assert!(same.status.success());
    assert_eq!(stdout(&same).trim(), "No differences found.");

    // Rename a function and rebuild.
    write(
        root,
        "src/io/loader.py",
        "def load(path: str) -> Shape:\n    pass\n\ndef persist():\n    pass\n",
    );
    assert!(architectum(root, &["extract", "--lang", "python", "--out", "architectum/structure/core_modules", "src"]).status.success());
    assert!(architectum(root, &["build-index"]).status.success());

    let changed = architectum(
        root,
        &["diff-index", index.to_str().unwrap(), previous.to_str().unwrap()],
    );
    assert!(changed.status.success());
    let diff = stdout(&changed);
    assert!(diff.contains(r#"-    <Function name="save" method="N/A" path="N/A">"#), "{}", diff);
    assert!(diff.contains(r#"+    <Function name="persist" method="N/A" path="N/A">"#), "{}", diff);
}

#[test]
fn test_extract_reports_failures_and_continues() {
    let project = create_project();
    let root = project.path();
    write(root, "src/broken.py", "def broken(:\n");

    let output = architectum(root, &["extract", "--lang", "python", "--out", "out", "src"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Failed:"), "{}", text);
    assert!(text.contains("2 written, 1 failed"), "{}", text);
    assert!(!root.join("out/broken.xml").exists());
}

#[test]
fn test_extract_json_summary() {
    let project = create_project();
    let root = project.path();

    let output = architectum(
        root,
        &["extract", "--lang", "python", "--out", "out", "--workers", "1", "--format", "json", "src/shapes.py"],
    );
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["language"], "python");
    assert_eq!(json["written"], 1);
    assert_eq!(json["files"][0]["types"], 1);
    assert_eq!(json["files"][0]["functions"], 1);
}

#[test]
fn test_bad_invocations_exit_with_failure() {
    let project = create_project();
    let root = project.path();

    let missing = architectum(root, &["extract", "--lang", "kotlin", "does/not/exist"]);
    assert_eq!(missing.status.code(), Some(1));

    let wrong_language = architectum(root, &["extract", "--lang", "kotlin", "src/shapes.py"]);
    assert_eq!(wrong_language.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&wrong_language.stderr).contains("not a kotlin source file"));

    let no_plan = architectum(root, &["build-index", "--plan", "nope.yaml"]);
    assert_eq!(no_plan.status.code(), Some(1));

    write(root, "bad_plan.yaml", "xml_groups: 42\n");
    let bad_plan = architectum(root, &["build-index", "--plan", "bad_plan.yaml"]);
    assert_eq!(bad_plan.status.code(), Some(1));

    write(root, "one.xml", "<Application name=\"a\" domain=\"python\"/>");
    let no_previous = architectum(root, &["diff-index", "one.xml", "missing.xml"]);
    assert_eq!(no_previous.status.code(), Some(1));
}

#[test]
fn test_settings_file_and_log_file() {
    let project = create_project();
    let root = project.path();
    write(root, "custom/plan.yaml", "xml_groups:\n  all: [docs]\n");
    write(
        root,
        "architectum.toml",
        "structure_dir = \"custom/structure\"\nplan = \"custom/plan.yaml\"\noutput_dir = \"custom/structure/docs\"\n",
    );

    let extracted = architectum(
        root,
        &["extract", "--lang", "python", "--log-file", "logs/run.log", "--log-level", "debug", "src"],
    );
    assert!(extracted.status.success());
    assert!(root.join("custom/structure/docs/shapes.xml").exists());
    let log = fs::read_to_string(root.join("logs/run.log")).unwrap();
    assert!(log.contains("Extracting 2 python files"), "{}", log);
    assert!(!log.contains("\u{1b}["), "log file must not contain ANSI escapes");

    let built = architectum(root, &["build-index", "--format", "json"]);
    assert!(built.status.success());
    let json: serde_json::Value = serde_json::from_slice(&built.stdout).unwrap();
    assert_eq!(json["groups"][0]["group"], "all");
    assert_eq!(json["groups"][0]["components"], 2);
    assert!(root.join("custom/structure/all_index.xml").exists());
}
