//! Error types for the grading core.
//!
//! Only out-of-contract input fails. Empty batches and empty extension
//! lists are normal states and never produce an error.

use thiserror::Error;

/// Errors raised by the grading core and its harness helpers.
#[derive(Error, Debug)]
pub enum GradingError {
    #[error("percent must be within [0, 100], got {percent}")]
    PercentOutOfRange { percent: f64 },

    #[error("grade must be a finite, non-negative value, got {value}")]
    GradeOutOfRange { value: f64 },

    #[error("inconsistent {batch} batch {id}: {reason}")]
    InconsistentBatch {
        batch: &'static str,
        id: u64,
        reason: String,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GradingError>;
