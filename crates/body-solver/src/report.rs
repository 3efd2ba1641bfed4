//! Per-constraint snapshot of current vs. target measurements.

use std::fmt;

use body_model::ShapeModel;
use body_types::Constraint;
use serde::Serialize;

use crate::measure::MeasurementProbe;

/// State of one constraint at report time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Measured { current: f64, error: f64 },
    Skipped { reason: String },
}

/// One constraint's line in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub measurement: String,
    pub parameter: String,
    pub target: f64,
    pub tolerance: f64,
    #[serde(flatten)]
    pub status: EntryStatus,
}

impl ReportEntry {
    pub fn current(&self) -> Option<f64> {
        match self.status {
            EntryStatus::Measured { current, .. } => Some(current),
            EntryStatus::Skipped { .. } => None,
        }
    }

    pub fn error(&self) -> Option<f64> {
        match self.status {
            EntryStatus::Measured { error, .. } => Some(error),
            EntryStatus::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, EntryStatus::Skipped { .. })
    }

    pub fn is_satisfied(&self) -> bool {
        self.error().is_some_and(|e| e < self.tolerance)
    }
}

/// Result of a solve: one entry per constraint, in priority order.
///
/// Non-convergence is a normal outcome, reported through `converged` and
/// the per-entry errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverReport {
    pub entries: Vec<ReportEntry>,
    /// At least one constraint was measured and every measured constraint
    /// is within tolerance.
    pub converged: bool,
    /// Sweeps started.
    pub outer_iterations: usize,
    /// Model deformations performed by the solver.
    pub deformations: usize,
    /// Decoupling nudges applied.
    pub decoupling_steps: usize,
}

impl SolverReport {
    /// Measure every constraint afresh. `skipped` gives the reason for
    /// constraints excluded from the solve, indexed like `constraints`.
    pub(crate) fn measure<M: ShapeModel + ?Sized>(
        model: &M,
        probe: &MeasurementProbe,
        constraints: &[Constraint],
        skipped: &[Option<String>],
    ) -> Self {
        let entries: Vec<ReportEntry> = constraints
            .iter()
            .zip(skipped)
            .map(|(c, skip)| {
                let status = match skip {
                    Some(reason) => EntryStatus::Skipped {
                        reason: reason.clone(),
                    },
                    None => match probe.measure(model, &c.measurement) {
                        Ok(current) => EntryStatus::Measured {
                            current,
                            error: (current - c.target).abs(),
                        },
                        Err(e) => EntryStatus::Skipped {
                            reason: e.to_string(),
                        },
                    },
                };
                ReportEntry {
                    measurement: c.measurement.clone(),
                    parameter: c.parameter.clone(),
                    target: c.target,
                    tolerance: c.tolerance,
                    status,
                }
            })
            .collect();
        let converged = all_measured_satisfied(&entries);
        Self {
            entries,
            converged,
            outer_iterations: 0,
            deformations: 0,
            decoupling_steps: 0,
        }
    }

    pub fn get(&self, measurement: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.measurement == measurement)
    }

    /// Measured entries outside tolerance.
    pub fn unsatisfied(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| !e.is_skipped() && !e.is_satisfied())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.is_skipped())
    }

    /// Converged with no constraint skipped.
    pub fn is_complete(&self) -> bool {
        self.converged && self.skipped().next().is_none()
    }

    /// Ranking key: unsatisfied count, then summed error in tolerance units.
    pub fn score(&self) -> (usize, f64) {
        let normalized = self
            .entries
            .iter()
            .filter_map(|e| e.error().map(|err| err / e.tolerance))
            .sum();
        (self.unsatisfied().count(), normalized)
    }

    /// Strictly better than `other` under `score`.
    pub fn is_better_than(&self, other: &SolverReport) -> bool {
        let (a_miss, a_err) = self.score();
        let (b_miss, b_err) = other.score();
        a_miss < b_miss || (a_miss == b_miss && a_err < b_err)
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn all_measured_satisfied(entries: &[ReportEntry]) -> bool {
    let mut measured = entries.iter().filter(|e| !e.is_skipped()).peekable();
    measured.peek().is_some() && measured.all(ReportEntry::is_satisfied)
}

impl fmt::Display for SolverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Body Solver Report ===")?;
        writeln!(
            f,
            "Converged: {} ({} sweeps, {} deformations, {} decoupling steps)",
            if self.converged { "yes" } else { "no" },
            self.outer_iterations,
            self.deformations,
            self.decoupling_steps,
        )?;
        writeln!(f)?;
        for e in &self.entries {
            match &e.status {
                EntryStatus::Measured { current, error } => {
                    let tag = if e.is_satisfied() { "OK" } else { "MISS" };
                    writeln!(
                        f,
                        "  [{:<4}] {:<16} current {:>8.2}  target {:>8.2}  error {:>6.2} (tol {:.2})",
                        tag, e.measurement, current, e.target, error, e.tolerance,
                    )?;
                }
                EntryStatus::Skipped { reason } => {
                    writeln!(f, "  [SKIP] {:<16} {}", e.measurement, reason)?;
                }
            }
        }
        Ok(())
    }
}
