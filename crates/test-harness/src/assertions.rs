//! Assertion helpers with diagnostic output.
//!
//! Failures carry the context string, the expected vs. actual values, and
//! the rendered report where one is involved.

use body_solver::{EntryStatus, SolverReport};

use crate::bench::BodyBench;
use crate::helpers::{HarnessError, fail};

/// Assert the report converged.
pub fn assert_converged(report: &SolverReport, ctx: &str) -> Result<(), HarnessError> {
    if report.converged {
        Ok(())
    } else {
        fail(format!("[{}] expected convergence\n{}", ctx, report))
    }
}

/// Assert a measured entry's error is below its tolerance.
pub fn assert_within_tolerance(
    report: &SolverReport,
    measurement: &str,
    ctx: &str,
) -> Result<(), HarnessError> {
    let entry = report.get(measurement).ok_or_else(|| HarnessError::MissingEntry {
        name: measurement.to_string(),
    })?;
    match &entry.status {
        EntryStatus::Measured { error, .. } if *error < entry.tolerance => Ok(()),
        EntryStatus::Measured { current, error } => fail(format!(
            "[{}] {}: current {:.3}, target {:.3}, error {:.3} >= tol {:.3}",
            ctx, measurement, current, entry.target, error, entry.tolerance,
        )),
        EntryStatus::Skipped { reason } => fail(format!(
            "[{}] {} was skipped: {}",
            ctx, measurement, reason
        )),
    }
}

/// Assert an entry was skipped with a reason containing `fragment`.
pub fn assert_skipped(
    report: &SolverReport,
    measurement: &str,
    fragment: &str,
    ctx: &str,
) -> Result<(), HarnessError> {
    let entry = report.get(measurement).ok_or_else(|| HarnessError::MissingEntry {
        name: measurement.to_string(),
    })?;
    match &entry.status {
        EntryStatus::Skipped { reason } if reason.contains(fragment) => Ok(()),
        EntryStatus::Skipped { reason } => fail(format!(
            "[{}] {} skipped with '{}', expected it to mention '{}'",
            ctx, measurement, reason, fragment
        )),
        EntryStatus::Measured { .. } => fail(format!(
            "[{}] expected {} to be skipped, but it was measured",
            ctx, measurement
        )),
    }
}

/// Assert the model was deformed no more than `limit` times.
pub fn assert_deformations_at_most(
    bench: &BodyBench,
    limit: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let count = bench.deformations();
    if count as usize <= limit {
        Ok(())
    } else {
        fail(format!(
            "[{}] expected at most {} deformations, got {}",
            ctx, limit, count
        ))
    }
}

/// Assert the live model agrees with every measured entry of the report.
pub fn assert_report_matches_model(
    bench: &BodyBench,
    report: &SolverReport,
    ctx: &str,
) -> Result<(), HarnessError> {
    for entry in &report.entries {
        let Some(reported) = entry.current() else {
            continue;
        };
        let actual = bench.measure(&entry.measurement)?;
        if (reported - actual).abs() > 1e-9 {
            return fail(format!(
                "[{}] {}: report says {:.6}, model measures {:.6}",
                ctx, entry.measurement, reported, actual
            ));
        }
    }
    Ok(())
}
