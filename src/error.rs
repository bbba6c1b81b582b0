// src/error.rs

use thiserror::Error;

/// Errors surfaced by the report-shaping pipeline.
///
/// Formatting paths never return these: a malformed cell value degrades to
/// the display placeholder instead of failing a render. Configuration
/// mismatches (unknown workflow, unregistered metric) are fatal on purpose
/// so they get caught in testing rather than masked in production.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown workflow type: {0:?}")]
    UnknownWorkflow(String),

    #[error("no capabilities configured for workflow {0:?}")]
    UnmappedWorkflow(String),

    #[error("metric {key:?} on taxon {tax_id} is not in the registry")]
    UnknownMetric { key: String, tax_id: i64 },

    #[error("report line {line}: {reason}")]
    MalformedReport { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
