//! Architectum CLI entry point

use std::path::PathBuf;
use std::process::ExitCode;

use architectum_core::{Language, RunContext, Settings};
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "architectum", version)]
#[command(about = "Extract source structure into XML documents, index and diff them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level
    #[arg(
        long,
        global = true,
        ignore_case = true,
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Settings file (defaults to ./architectum.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one structural document per source file
    Extract {
        /// Source language: python, typescript, kotlin or flutter
        #[arg(long)]
        lang: Language,

        /// Output directory for the documents
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of extraction workers
        #[arg(long)]
        workers: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Source file or directory
        path: PathBuf,
    },
    /// Aggregate documents into one index per plan group
    BuildIndex {
        /// Aggregation plan (YAML)
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Structure directory holding the documents
        #[arg(long)]
        structure: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the canonical difference between two documents
    DiffIndex {
        /// Current document
        current: PathBuf,

        /// Previous document
        previous: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version are not errors.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        cli.log_level
            .clone()
            .unwrap_or_else(|| settings.log_level.clone())
            .to_ascii_lowercase()
    };
    let dispatch = logging::build_dispatch(&level, cli.log_file.as_deref())?;
    let ctx = RunContext::new(dispatch);

    ctx.in_scope(|| tracing::debug!("Architectum v{}", env!("CARGO_PKG_VERSION")));

    match cli.command {
        Commands::Extract {
            lang,
            out,
            workers,
            format,
            path,
        } => {
            let ctx = ctx.with_workers(workers.or(settings.workers).unwrap_or(0));
            let out = out.unwrap_or_else(|| settings.output_dir.clone());
            commands::extract(&ctx, lang, &path, &out, format)
        }
        Commands::BuildIndex {
            plan,
            structure,
            format,
        } => {
            let plan = plan.unwrap_or_else(|| settings.plan.clone());
            let structure = structure.unwrap_or_else(|| settings.structure_dir.clone());
            commands::build_index(&ctx, &plan, &structure, format)
        }
        Commands::DiffIndex { current, previous } => {
            commands::diff_index(&ctx, &current, &previous)
        }
    }
}
