//! Orchestrates parallel extraction
//!
//! Sources are discovered up front, assigned output paths, then extracted on a
//! bounded rayon pool. Every source yields exactly one [`FileOutcome`], in
//! discovery order, whatever happens to the others.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use architectum_core::error::{ArchitectumError, Result};
use architectum_core::{ErrorSummary, Language, RunContext, store};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;

use crate::extractor::{Fidelity, LanguageExtractor};
use crate::languages;

/// Outcome of one extraction run.
#[derive(Debug)]
pub struct BatchReport {
    pub language: Language,
    pub fidelity: Fidelity,
    pub outcomes: Vec<FileOutcome>,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub status: FileStatus,
}

#[derive(Debug)]
pub enum FileStatus {
    Written {
        output: PathBuf,
        types: usize,
        functions: usize,
    },
    Failed(ArchitectumError),
    /// Another source with the same stem owns the output path.
    Shadowed { by: PathBuf },
    /// The run was cancelled before this file was started.
    Cancelled,
}

/// What a walk over an extraction target turned up.
#[derive(Debug, Default)]
pub struct Discovery {
    pub sources: Vec<PathBuf>,
    /// Entries the walk could not read, each with the number of sources
    /// discovered before it.
    pub unreadable: Vec<(usize, FileOutcome)>,
}

/// Source files of `language` under `target`, sorted by path components.
///
/// A directory is walked recursively, skipping hidden and ignored entries. An
/// explicit file must carry one of the language's extensions. Entries the
/// walk cannot read are kept as failed outcomes rather than dropped.
pub fn discover_sources(target: &Path, language: Language) -> Result<Discovery> {
    let metadata = std::fs::metadata(target).map_err(|e| ArchitectumError::io(target, e))?;

    if !metadata.is_dir() {
        if !language.matches_path(target) {
            return Err(ArchitectumError::NotASource {
                path: target.to_path_buf(),
                language: language.to_string(),
            });
        }
        return Ok(Discovery {
            sources: vec![target.to_path_buf()],
            unreadable: Vec::new(),
        });
    }

    let walker = WalkBuilder::new(target)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut discovery = Discovery::default();
    for entry in walker {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) && language.matches_path(path) {
                    discovery.sources.push(path.to_path_buf());
                }
            }
            Err(err) => {
                tracing::warn!("Unreadable entry under {}: {err}", target.display());
                let failure = walk_failure(target, err);
                discovery.unreadable.push((discovery.sources.len(), failure));
            }
        }
    }
    Ok(discovery)
}

fn walk_failure(target: &Path, err: ignore::Error) -> FileOutcome {
    let path = walk_error_path(&err).unwrap_or(target).to_path_buf();
    let source = match err.io_error() {
        Some(io) => std::io::Error::new(io.kind(), io.to_string()),
        None => std::io::Error::other(err.to_string()),
    };
    FileOutcome {
        status: FileStatus::Failed(ArchitectumError::io(&path, source)),
        source: path,
    }
}

fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        _ => None,
    }
}

/// Slot walk failures back between the extracted sources they were found among.
fn merge_outcomes(
    extracted: Vec<FileOutcome>,
    unreadable: Vec<(usize, FileOutcome)>,
) -> Vec<FileOutcome> {
    let mut merged = Vec::with_capacity(extracted.len() + unreadable.len());
    let mut pending = unreadable.into_iter().peekable();
    for (index, outcome) in extracted.into_iter().enumerate() {
        while let Some((_, failure)) = pending.next_if(|(before, _)| *before <= index) {
            merged.push(failure);
        }
        merged.push(outcome);
    }
    merged.extend(pending.map(|(_, failure)| failure));
    merged
}

/// Extract every `language` source under `target` into `out_dir`.
///
/// Only a missing target, a bad explicit target or a failure to set up the
/// extractor or the pool is an error; per-file problems, unreadable entries
/// included, land in the report.
pub fn run_extraction(
    ctx: &RunContext,
    language: Language,
    target: &Path,
    out_dir: &Path,
) -> Result<BatchReport> {
    let extractor = languages::extractor_for(language)?;
    let discovery = ctx.in_scope(|| discover_sources(target, language))?;
    ctx.in_scope(|| {
        tracing::info!(
            "Extracting {} {} files from {} with {} workers",
            discovery.sources.len(),
            language,
            target.display(),
            ctx.workers()
        )
    });
    let mut report = extract_sources(ctx, extractor.as_ref(), &discovery.sources, out_dir)?;
    report.outcomes = merge_outcomes(report.outcomes, discovery.unreadable);
    Ok(report)
}

/// Extract an already discovered list of sources.
pub fn extract_sources(
    ctx: &RunContext,
    extractor: &dyn LanguageExtractor,
    sources: &[PathBuf],
    out_dir: &Path,
) -> Result<BatchReport> {
    let plan = plan_outputs(sources, out_dir);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ctx.workers())
        .thread_name(|i| format!("architectum-extract-{i}"))
        .build()
        .map_err(|e| ArchitectumError::Extractor(format!("failed to start worker pool: {e}")))?;

    let outcomes: Vec<FileOutcome> = pool.install(|| {
        plan.par_iter()
            .map(|(source, target)| {
                let status = match target {
                    OutputPlan::ShadowedBy(by) => {
                        ctx.in_scope(|| {
                            tracing::warn!(
                                "{} shares its output with {}, skipping",
                                source.display(),
                                by.display()
                            )
                        });
                        FileStatus::Shadowed { by: by.clone() }
                    }
                    OutputPlan::Write(_) if ctx.is_cancelled() => FileStatus::Cancelled,
                    OutputPlan::Write(output) => {
                        ctx.in_scope(|| extract_one(extractor, source, output))
                    }
                };
                FileOutcome {
                    source: source.clone(),
                    status,
                }
            })
            .collect()
    });

    Ok(BatchReport {
        language: extractor.language(),
        fidelity: extractor.fidelity(),
        outcomes,
    })
}

enum OutputPlan {
    Write(PathBuf),
    ShadowedBy(PathBuf),
}

/// Assign each source its output path. When several sources share a stem,
/// the last one in discovery order is written.
fn plan_outputs(sources: &[PathBuf], out_dir: &Path) -> Vec<(PathBuf, OutputPlan)> {
    let outputs: Vec<PathBuf> = sources
        .iter()
        .map(|source| store::document_path(out_dir, source))
        .collect();

    let mut owner: HashMap<&Path, usize> = HashMap::new();
    for (index, output) in outputs.iter().enumerate() {
        owner.insert(output.as_path(), index);
    }

    sources
        .iter()
        .zip(&outputs)
        .enumerate()
        .map(|(index, (source, output))| {
            let winner = owner[output.as_path()];
            let plan = if winner == index {
                OutputPlan::Write(output.clone())
            } else {
                OutputPlan::ShadowedBy(sources[winner].clone())
            };
            (source.clone(), plan)
        })
        .collect()
}

fn extract_one(extractor: &dyn LanguageExtractor, source: &Path, output: &Path) -> FileStatus {
    let span = tracing::debug_span!("extract", file = %source.display());
    let _enter = span.enter();

    let result = extractor.parse(source).and_then(|doc| {
        store::write_document(&doc, output)?;
        Ok((doc.type_count(), doc.function_count()))
    });

    match result {
        Ok((types, functions)) => {
            tracing::debug!("Wrote {} ({types} types, {functions} functions)", output.display());
            FileStatus::Written {
                output: output.to_path_buf(),
                types,
                functions,
            }
        }
        Err(err) => {
            tracing::warn!("{err}");
            FileStatus::Failed(err)
        }
    }
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Written { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed(_)))
    }

    pub fn shadowed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Shadowed { .. }))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Cancelled))
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// JSON-friendly view of the report.
    pub fn summary(&self) -> BatchSummary<'_> {
        BatchSummary {
            language: self.language,
            fidelity: self.fidelity,
            written: self.written(),
            failed: self.failed(),
            shadowed: self.shadowed(),
            cancelled: self.cancelled(),
            files: self.outcomes.iter().map(FileSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSummary<'a> {
    pub language: Language,
    pub fidelity: Fidelity,
    pub written: usize,
    pub failed: usize,
    pub shadowed: usize,
    pub cancelled: usize,
    pub files: Vec<FileSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FileSummary<'a> {
    pub source: &'a Path,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadowed_by: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

impl<'a> From<&'a FileOutcome> for FileSummary<'a> {
    fn from(outcome: &'a FileOutcome) -> Self {
        let mut summary = FileSummary {
            source: &outcome.source,
            status: "",
            output: None,
            types: None,
            functions: None,
            shadowed_by: None,
            error: None,
        };
        match &outcome.status {
            FileStatus::Written {
                output,
                types,
                functions,
            } => {
                summary.status = "written";
                summary.output = Some(output.as_path());
                summary.types = Some(*types);
                summary.functions = Some(*functions);
            }
            FileStatus::Failed(err) => {
                summary.status = "failed";
                summary.error = Some(ErrorSummary {
                    kind: err.kind(),
                    message: err.to_string(),
                });
            }
            FileStatus::Shadowed { by } => {
                summary.status = "shadowed";
                summary.shadowed_by = Some(by.as_path());
            }
            FileStatus::Cancelled => summary.status = "cancelled",
        }
        summary
    }
}
