//! Architectum Core: structural schema, canonical XML, aggregation and diff

pub mod aggregation;
pub mod config;
pub mod context;
pub mod diff;
pub mod document;
pub mod error;
pub mod model;
pub mod plan;
pub mod store;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use aggregation::{
    AggregationReport, ErrorSummary, GroupIndexSummary, GroupOutcome, build_indexes,
};
pub use config::Settings;
pub use context::RunContext;
pub use diff::{ChangeSet, IndexDiff, NO_DIFFERENCES, diff_index_files};
pub use document::XmlElement;
pub use error::{ArchitectumError, Result};
pub use model::{
    CallRef, Component, FunctionSignature, Language, Member, Property, Returns,
    StructuralDocument, TypeDefinition, TypeKind,
};
pub use plan::{Plan, PlanGroup};
