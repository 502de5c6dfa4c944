//! Planner Error Types
//!
//! One error enum for every failure the planning pipeline reports upward.
//! Simulator run failures are not errors: they are `RunOutcome` values so the
//! caller always gets the exit code and diagnostic text back.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    /// A reservoir field could not be coerced to a number.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// Result tables disagree in shape or carry malformed labels/cells.
    #[error("Result table shape error: {0}")]
    TableShape(String),

    /// A precondition on stored state is not met (e.g. no reservoir profile).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Optimization was requested without a table to optimize over.
    #[error("No source data for optimization: {0}")]
    NoSourceData(String),

    /// Another simulator run holds the workspace lock.
    #[error("A simulation run is already in progress (PID: {pid}, lock: {lock_path:?})")]
    RunInProgress { pid: u32, lock_path: PathBuf },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlannerError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn table_shape(message: impl Into<String>) -> Self {
        Self::TableShape(message.into())
    }
}

/// Result alias used across the planner.
pub type PlannerResult<T> = Result<T, PlannerError>;
