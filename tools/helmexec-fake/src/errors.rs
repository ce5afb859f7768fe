use crate::fake::keys::{DiffKey, ListKey};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HelmExecError {
    #[error("simulated {operation} failure for {target}")]
    Simulated {
        operation: &'static str,
        target: String,
    },
    #[error("unexpected list key: {key} not found in {}", .known.join(", "))]
    UnexpectedList { key: ListKey, known: Vec<String> },
    #[error("unexpected diff with key: {key}")]
    UnexpectedDiff { key: DiffKey },
    #[error("diff failed: {0}")]
    Diff(String),
    #[error("update-deps callback failed: {0}")]
    Callback(String),
    #[error("chart metadata not found: {0}")]
    ChartLookup(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(String),
}
