use body_model::ModelError;
use body_types::{ConstraintError, RequestError};
use thiserror::Error;

/// Errors from a single measurement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("unknown measurement: {name}")]
    UnknownMeasurement { name: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors that stop a solve before any deformation happens.
///
/// Per-constraint failures never surface here; they become skipped entries
/// in the report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("invalid solver configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    InvalidConstraint(#[from] ConstraintError),

    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
}
