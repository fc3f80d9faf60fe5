//! Canonical diff between two structural documents

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::document::XmlElement;
use crate::error::{ArchitectumError, Result};

/// Message printed when two documents are semantically identical.
pub const NO_DIFFERENCES: &str = "No differences found.";

/// Lines of context around each hunk.
const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IndexDiff {
    Identical,
    Changed(ChangeSet),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Unified diff from previous to current.
    pub unified: String,
    pub added: usize,
    pub removed: usize,
}

impl IndexDiff {
    pub fn is_identical(&self) -> bool {
        matches!(self, IndexDiff::Identical)
    }
}

impl fmt::Display for IndexDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexDiff::Identical => f.write_str(NO_DIFFERENCES),
            IndexDiff::Changed(changes) => f.write_str(changes.unified.trim_end_matches('\n')),
        }
    }
}

/// Read `path` and return its canonical serialization.
///
/// Every failure is reported as a load error naming `path`.
pub fn load_canonical(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| ArchitectumError::load(path, e.to_string()))?;
    let root = XmlElement::parse(&text).map_err(|e| ArchitectumError::load(path, e.to_string()))?;
    Ok(root.to_canonical_string())
}

/// Line diff of two canonical forms.
pub fn diff_canonical(
    previous: &str,
    current: &str,
    previous_label: &str,
    current_label: &str,
) -> IndexDiff {
    if previous == current {
        return IndexDiff::Identical;
    }

    let text_diff = TextDiff::from_lines(previous, current);
    let (mut added, mut removed) = (0, 0);
    for change in text_diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => removed += 1,
            ChangeTag::Equal => {}
        }
    }

    let unified = text_diff
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(previous_label, current_label)
        .to_string();

    IndexDiff::Changed(ChangeSet {
        unified,
        added,
        removed,
    })
}

/// Diff two documents on disk, `previous` → `current`.
pub fn diff_index_files(current: &Path, previous: &Path) -> Result<IndexDiff> {
    let current_text = load_canonical(current)?;
    let previous_text = load_canonical(previous)?;

    let diff = diff_canonical(
        &previous_text,
        &current_text,
        &previous.display().to_string(),
        &current.display().to_string(),
    );
    if let IndexDiff::Changed(changes) = &diff {
        tracing::debug!(
            added = changes.added,
            removed = changes.removed,
            "Documents differ"
        );
    }
    Ok(diff)
}
