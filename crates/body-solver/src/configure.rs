//! One-call body configuration from a `BodyRequest`.

use body_model::ShapeModel;
use body_types::{BodyRequest, names};
use tracing::{info, instrument, warn};

use crate::config::SolverConfig;
use crate::descent::CoordinateDescentSolver;
use crate::error::SolverError;
use crate::measure::MeasurementProbe;
use crate::report::SolverReport;

/// Validate `request`, set the direct height value, then solve the limb
/// (and optional measured height) constraints.
///
/// A model without the height modifier keeps its height and logs a
/// warning; the limb constraints are still solved.
#[instrument(skip(model, probe, config))]
pub fn configure_body<M: ShapeModel + ?Sized>(
    model: &mut M,
    probe: &MeasurementProbe,
    request: &BodyRequest,
    config: &SolverConfig,
) -> Result<SolverReport, SolverError> {
    request.validate()?;
    let solver = CoordinateDescentSolver::new(probe.clone(), config.clone())?;
    let constraints = request.constraints();
    constraints.validate()?;

    match model.apply_value(names::HEIGHT_MODIFIER, request.height) {
        Ok(value) => info!(value, "height modifier set"),
        Err(e) => warn!(error = %e, "height modifier unavailable, keeping model height"),
    }

    let report = solver.solve(model, &constraints)?;
    for entry in &report.entries {
        match (entry.current(), entry.error()) {
            (Some(current), Some(error)) => info!(
                measurement = %entry.measurement,
                current,
                target = entry.target,
                error,
                "measurement"
            ),
            _ => warn!(measurement = %entry.measurement, "measurement skipped"),
        }
    }
    Ok(report)
}
