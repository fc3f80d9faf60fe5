//! CLI command implementations

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use architectum_core::{Language, Plan, RunContext, build_indexes, diff_index_files};
use architectum_extractor::{FileStatus, run_extraction};

use crate::OutputFormat;

pub fn extract(
    ctx: &RunContext,
    language: Language,
    target: &Path,
    out_dir: &Path,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let report = run_extraction(ctx, language, target, out_dir)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.summary())?);
        }
        OutputFormat::Text => {
            for outcome in &report.outcomes {
                match &outcome.status {
                    FileStatus::Written { output, .. } => {
                        println!("Extracted XML: {}", output.display())
                    }
                    FileStatus::Failed(err) => {
                        println!("Failed: {} ({err})", outcome.source.display())
                    }
                    FileStatus::Shadowed { by } => println!(
                        "Skipped: {} (same output as {})",
                        outcome.source.display(),
                        by.display()
                    ),
                    FileStatus::Cancelled => {
                        println!("Cancelled: {}", outcome.source.display())
                    }
                }
            }
            println!(
                "{} written, {} failed, {} skipped",
                report.written(),
                report.failed(),
                report.shadowed() + report.cancelled()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub fn build_index(
    ctx: &RunContext,
    plan_path: &Path,
    structure: &Path,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let plan = Plan::load(plan_path)?;
    ctx.in_scope(|| {
        tracing::info!(
            "Building {} indexes from {}",
            plan.groups.len(),
            structure.display()
        )
    });

    let report = build_indexes(ctx, &plan, structure, structure);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.summary())?);
        }
        OutputFormat::Text => {
            for outcome in &report.outcomes {
                match &outcome.result {
                    Ok(index) => println!(
                        "Wrote: {} ({} components)",
                        index.output.display(),
                        index.components
                    ),
                    Err(err) => println!("Failed: {} ({err})", outcome.group),
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub fn diff_index(ctx: &RunContext, current: &Path, previous: &Path) -> anyhow::Result<ExitCode> {
    let diff = ctx
        .in_scope(|| diff_index_files(current, previous))
        .context("diff-index failed")?;
    println!("{diff}");
    Ok(ExitCode::SUCCESS)
}
