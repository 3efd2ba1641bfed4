//! Helper types shared by the harness.

use body_model::ModelError;
use body_solver::{MeasureError, SolverError};

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("measurement not in report: {name}")]
    MissingEntry { name: String },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("measure error: {0}")]
    Measure(#[from] MeasureError),

    #[error("solver error: {0}")]
    Solver(#[from] SolverError),
}

pub(crate) fn fail<T>(detail: String) -> Result<T, HarnessError> {
    Err(HarnessError::AssertionFailed { detail })
}
