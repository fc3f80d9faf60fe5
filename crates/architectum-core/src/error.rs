//! Error taxonomy shared by every pipeline stage

use std::path::{Path, PathBuf};

/// Unified error type for Architectum.
#[derive(Debug, thiserror::Error)]
pub enum ArchitectumError {
    /// A path is missing or cannot be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be parsed by its extractor.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The plan or the settings file is missing or malformed.
    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// A document handed to the differ is missing or unparsable.
    #[error("cannot load {} for comparison: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// An output document could not be persisted.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: usize, message: String },

    /// Well-formed XML that does not follow the structural schema.
    #[error("schema violation: {0}")]
    Schema(String),

    /// An explicit extraction target does not belong to the selected language.
    #[error("{} is not a {language} source file", path.display())]
    NotASource { path: PathBuf, language: String },

    /// Extractor setup failed (grammar loading, pattern compilation, worker pool).
    #[error("extractor error: {0}")]
    Extractor(String),
}

impl ArchitectumError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ArchitectumError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ArchitectumError::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn config(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ArchitectumError::Config {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn load(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ArchitectumError::Load {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Short machine-readable category, used in JSON summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ArchitectumError::Io { .. } => "io",
            ArchitectumError::Parse { .. } => "parse",
            ArchitectumError::Config { .. } => "config",
            ArchitectumError::Load { .. } => "load",
            ArchitectumError::Write { .. } => "write",
            ArchitectumError::Xml { .. } => "xml",
            ArchitectumError::Schema(_) => "schema",
            ArchitectumError::NotASource { .. } => "invocation",
            ArchitectumError::Extractor(_) => "extractor",
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchitectumError>;
