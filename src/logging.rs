//! Subscriber assembly for the CLI

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing::Dispatch;
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Environment variable holding a full filter directive, e.g. `architectum_core=trace`.
pub const LOG_ENV: &str = "ARCHITECTUM_LOG";

const CRATES: &[&str] = &["architectum", "architectum_core", "architectum_extractor"];

/// Field formatter for the log file.
///
/// Span fields are formatted once per formatter type and cached on the span,
/// so the file layer needs a type of its own or it reuses the colored fields
/// of the stderr layer.
struct PlainFields(DefaultFields);

impl<'writer> FormatFields<'writer> for PlainFields {
    fn format_fields<R: RecordFields>(
        &self,
        writer: Writer<'writer>,
        fields: R,
    ) -> std::fmt::Result {
        self.0.format_fields(writer, fields)
    }
}

/// Build the dispatcher handed to [`architectum_core::RunContext`].
///
/// Events go to stderr, and additionally to `log_file` without colors.
pub fn build_dispatch(level: &str, log_file: Option<&Path>) -> anyhow::Result<Dispatch> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid ${LOG_ENV} filter '{directives}'"))?,
        _ => {
            let directives: Vec<String> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
            EnvFilter::try_new(directives.join(","))
                .with_context(|| format!("invalid log level '{level}'"))?
        }
    };

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .fmt_fields(PlainFields(DefaultFields::new()))
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer);

    Ok(Dispatch::new(subscriber))
}
