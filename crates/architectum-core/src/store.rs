//! Structure directory layout and document persistence

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::document::XmlElement;
use crate::error::{ArchitectumError, Result};
use crate::model::StructuralDocument;

/// Extension of every structural document.
pub const DOCUMENT_EXTENSION: &str = "xml";

/// Suffix of group index files at the structure root.
pub const INDEX_SUFFIX: &str = "_index";

/// Output path of the document extracted from `source`.
pub fn document_path(out_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{stem}.{DOCUMENT_EXTENSION}"))
}

/// Output path of a group index.
pub fn index_path(structure_root: &Path, group: &str) -> PathBuf {
    structure_root.join(format!("{group}{INDEX_SUFFIX}.{DOCUMENT_EXTENSION}"))
}

/// Whether `path` looks like a structural document.
pub fn is_document(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(DOCUMENT_EXTENSION)
}

/// Write `contents` to `path` through a temp file in the same directory.
///
/// The temp file is renamed over `path` only after every byte is written, so
/// a failure leaves either the previous file or nothing.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let write_err = |source| ArchitectumError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(&parent).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Serialize `doc` canonically and write it to `path`.
pub fn write_document(doc: &StructuralDocument, path: &Path) -> Result<()> {
    write_atomic(path, &doc.to_canonical_xml())
}

/// Serialize an arbitrary element tree canonically and write it to `path`.
pub fn write_element(root: &XmlElement, path: &Path) -> Result<()> {
    write_atomic(path, &root.to_canonical_string())
}

/// Read and parse the XML tree at `path`.
pub fn read_element(path: &Path) -> Result<XmlElement> {
    let text = fs::read_to_string(path).map_err(|e| ArchitectumError::io(path, e))?;
    XmlElement::parse(&text)
}

/// Read a structural document and validate it against the schema.
pub fn read_document(path: &Path) -> Result<StructuralDocument> {
    let root = read_element(path)?;
    StructuralDocument::try_from(&root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, Language};
    use tempfile::TempDir;

    #[test]
    fn test_document_path_uses_stem() {
        let out = Path::new("structure");
        assert_eq!(
            document_path(out, Path::new("src/app/models.py")),
            PathBuf::from("structure/models.xml")
        );
        assert_eq!(
            index_path(out, "core"),
            PathBuf::from("structure/core_index.xml")
        );
    }

    #[test]
    fn test_write_atomic_creates_parents_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/out.xml");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path() != path)
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
    }

    #[test]
    fn test_document_survives_write_and_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("models.xml");
        let doc = StructuralDocument::extracted(
            Language::Kotlin,
            Component::for_source(Path::new("models.kt"), Language::Kotlin),
        );

        write_document(&doc, &path).unwrap();
        assert_eq!(read_document(&path).unwrap(), doc);
    }

    #[test]
    fn test_read_missing_document_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = read_element(&temp.path().join("absent.xml")).unwrap_err();
        assert!(matches!(err, ArchitectumError::Io { .. }));
    }
}
