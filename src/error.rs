//! Error types for Sleepscope

use thiserror::Error;

/// One dataset source that failed during the startup load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// Dataset name (e.g. "health")
    pub dataset: String,
    /// Human-readable reason
    pub reason: String,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.dataset, self.reason)
    }
}

/// Errors that can occur while loading or shaping dashboard data
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Failed to load datasets: {}", join_failures(.failures))]
    Load { failures: Vec<SourceFailure> },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing column '{column}' in {dataset} dataset")]
    MissingColumn { dataset: String, column: String },

    #[error("Invalid scale domain: {0}")]
    InvalidDomain(String),

    #[error("Invalid bucket boundaries: {0}")]
    InvalidBuckets(String),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Unknown record: {0}")]
    UnknownRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn join_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
