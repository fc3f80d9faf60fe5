//! Group index aggregation driven by a [`Plan`]
//!
//! Components are copied as element trees, not through the typed schema, so
//! anything a document carries beyond the schema survives into the index.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::Serialize;

use crate::context::RunContext;
use crate::document::XmlElement;
use crate::error::{ArchitectumError, Result};
use crate::model::COMPOSITE_DOMAIN;
use crate::plan::{Plan, PlanGroup};
use crate::store;

/// Prefix of the application name written on group indexes.
pub const INDEX_NAME_PREFIX: &str = "index_";

/// Result of aggregating every group of a plan.
#[derive(Debug)]
pub struct AggregationReport {
    pub outcomes: Vec<GroupOutcome>,
}

/// Per-group result. A failed group does not stop the others.
#[derive(Debug)]
pub struct GroupOutcome {
    pub group: String,
    pub result: Result<GroupIndexSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupIndexSummary {
    pub output: PathBuf,
    /// Documents whose components were merged.
    pub documents: usize,
    pub components: usize,
    /// Documents skipped because they already are indexes.
    pub skipped_composites: usize,
}

impl AggregationReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &ArchitectumError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.group.as_str(), e)))
    }

    /// JSON-friendly view of the report.
    pub fn summary(&self) -> AggregationSummary<'_> {
        AggregationSummary {
            groups: self
                .outcomes
                .iter()
                .map(|o| match &o.result {
                    Ok(index) => GroupSummary {
                        group: &o.group,
                        status: "written",
                        index: Some(index),
                        error: None,
                    },
                    Err(err) => GroupSummary {
                        group: &o.group,
                        status: "failed",
                        index: None,
                        error: Some(ErrorSummary {
                            kind: err.kind(),
                            message: err.to_string(),
                        }),
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AggregationSummary<'a> {
    pub groups: Vec<GroupSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary<'a> {
    pub group: &'a str,
    pub status: &'static str,
    #[serde(flatten)]
    pub index: Option<&'a GroupIndexSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

#[derive(Debug, Serialize)]
pub struct ErrorSummary {
    pub kind: &'static str,
    pub message: String,
}

/// Build one index per plan group, in plan order.
pub fn build_indexes(
    ctx: &RunContext,
    plan: &Plan,
    structure_root: &Path,
    output_root: &Path,
) -> AggregationReport {
    ctx.in_scope(|| {
        let outcomes = plan
            .groups
            .iter()
            .map(|group| {
                let span = tracing::info_span!("group", name = %group.name);
                let _enter = span.enter();

                let result = build_group_index(group, structure_root, output_root);
                match &result {
                    Ok(index) => tracing::info!(
                        "Wrote {} ({} components from {} documents)",
                        index.output.display(),
                        index.components,
                        index.documents
                    ),
                    Err(err) => tracing::error!("Group failed: {err}"),
                }
                GroupOutcome {
                    group: group.name.clone(),
                    result,
                }
            })
            .collect();
        AggregationReport { outcomes }
    })
}

/// Aggregate a single group and write its index.
pub fn build_group_index(
    group: &PlanGroup,
    structure_root: &Path,
    output_root: &Path,
) -> Result<GroupIndexSummary> {
    let documents = collect_documents(structure_root, &group.folders)?;

    let mut index = XmlElement::new("Application")
        .with_attr("name", format!("{INDEX_NAME_PREFIX}{}", group.name))
        .with_attr("domain", COMPOSITE_DOMAIN);
    let mut merged = 0;
    let mut skipped_composites = 0;

    for path in &documents {
        let root = store::read_element(path)?;
        if root.name != "Application" {
            return Err(ArchitectumError::Schema(format!(
                "{}: expected <Application> root, found <{}>",
                path.display(),
                root.name
            )));
        }
        if root.attr("domain") == Some(COMPOSITE_DOMAIN) {
            tracing::debug!("Skipping index document {}", path.display());
            skipped_composites += 1;
            continue;
        }

        merged += 1;
        for component in root.children.into_iter().filter(|c| c.name == "Component") {
            index.push(component);
        }
    }

    let output = store::index_path(output_root, &group.name);
    let components = index.children.len();
    store::write_element(&index, &output)?;

    Ok(GroupIndexSummary {
        output,
        documents: merged,
        components,
        skipped_composites,
    })
}

/// Every structural document under `folders`, folder by folder in the
/// given order, depth-first by file name within a folder.
///
/// Folders that do not exist are skipped with a warning.
pub fn collect_documents(structure_root: &Path, folders: &[String]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for folder in folders {
        let dir = structure_root.join(folder);
        if !dir.is_dir() {
            tracing::warn!("Plan folder {} does not exist, skipping", dir.display());
            continue;
        }

        let walker = WalkBuilder::new(&dir)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| {
                ArchitectumError::io(&dir, std::io::Error::other(e.to_string()))
            })?;
            let path = entry.path();
            if entry.file_type().is_some_and(|t| t.is_file()) && store::is_document(path) {
                documents.push(path.to_path_buf());
            }
        }
    }

    Ok(documents)
}
