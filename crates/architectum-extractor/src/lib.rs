//! Source parsing and structural extraction

pub mod coordinator;
pub mod extractor;
pub mod languages;
pub mod parser;


pub use coordinator::{BatchReport, FileOutcome, FileStatus, discover_sources, run_extraction};
pub use extractor::{Fidelity, LanguageExtractor};
pub use languages::{extractor_for, extractor_for_path};
