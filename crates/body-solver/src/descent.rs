//! Coordinate descent over shape parameters.
//!
//! Each sweep bisects every constraint's parameter against its own
//! measurement in priority order, then re-measures everything. Parameters
//! are coupled (a leg-length change moves the top of the head), so the
//! primary measurement (height by default) can drift after the later
//! searches; when it does, a decoupling axis is nudged toward the primary
//! target before the next sweep. Without a constraint on the primary
//! measurement there is no nudge.
//!
//! Every model mutation is charged to a `DeformationBudget` sized at
//! `max_outer_iterations` times the summed per-constraint search caps.

use body_model::{ParameterAssignment, ShapeModel, ShapeParameter};
use body_types::{Constraint, ConstraintSet};
use tracing::{debug, info, instrument, warn};

use crate::budget::DeformationBudget;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::measure::MeasurementProbe;
use crate::report::SolverReport;
use crate::root_finder::{BisectionConfig, bisect};

/// Measurement-constrained shape solver.
#[derive(Debug, Clone)]
pub struct CoordinateDescentSolver {
    probe: MeasurementProbe,
    config: SolverConfig,
}

impl CoordinateDescentSolver {
    pub fn new(probe: MeasurementProbe, config: SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self { probe, config })
    }

    pub fn probe(&self) -> &MeasurementProbe {
        &self.probe
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Drive `model` toward `constraints` and report the outcome.
    ///
    /// Returns `Err` only for malformed constraints, before the model is
    /// touched. Missing parameters and unknown measurements skip their
    /// constraint; running out of sweeps returns the best report seen and
    /// leaves the model in the state that report describes.
    #[instrument(skip(self, model, constraints), fields(constraints = constraints.len()))]
    pub fn solve<M: ShapeModel + ?Sized>(
        &self,
        model: &mut M,
        constraints: &ConstraintSet,
    ) -> Result<SolverReport, SolverError> {
        constraints.validate()?;
        let constraints = constraints.as_slice();

        let mut skipped: Vec<Option<String>> = constraints
            .iter()
            .map(|c| self.resolve(model, c))
            .collect();

        // One deformation is held back for restoring the best state.
        if skipped.iter().all(Option::is_some) {
            warn!("no measurable constraint, nothing to solve");
            return Ok(SolverReport::measure(model, &self.probe, constraints, &skipped));
        }

        let cap = self.config.deformation_cap(constraints);
        let mut budget = DeformationBudget::new(cap.saturating_sub(1));
        let mut decoupling_steps = 0;
        let mut sweeps = 0;
        let mut best: Option<(SolverReport, Vec<ParameterAssignment>)> = None;

        info!(cap, sweeps = self.config.max_outer_iterations, "starting shape solve");

        for outer in 0..self.config.max_outer_iterations {
            sweeps = outer + 1;
            for (position, constraint) in constraints.iter().enumerate() {
                if skipped[position].is_some() {
                    continue;
                }
                if let Err(reason) = self.solve_constraint(model, constraint, &mut budget) {
                    warn!(
                        measurement = %constraint.measurement,
                        parameter = %constraint.parameter,
                        %reason,
                        "skipping constraint"
                    );
                    skipped[position] = Some(reason);
                }
            }

            let report = self.finish(
                SolverReport::measure(model, &self.probe, constraints, &skipped),
                sweeps,
                budget.spent(),
                decoupling_steps,
            );
            info!(
                sweep = sweeps,
                converged = report.converged,
                unsatisfied = report.unsatisfied().count(),
                deformations = budget.spent(),
                "sweep finished"
            );
            if report.converged {
                return Ok(report);
            }

            if best.as_ref().is_none_or(|(b, _)| report.is_better_than(b)) {
                best = Some((report.clone(), self.snapshot(model, constraints)));
            }

            if budget.is_exhausted() {
                warn!(spent = budget.spent(), "deformation budget exhausted");
                break;
            }

            // Nudging after the final sweep would leave the report stale.
            if outer + 1 == self.config.max_outer_iterations {
                continue;
            }
            let drift = constraints
                .iter()
                .zip(&report.entries)
                .find(|(c, _)| self.config.is_primary(&c.measurement))
                .filter(|(_, entry)| !entry.is_satisfied())
                .and_then(|(primary, entry)| entry.current().map(|current| (primary, current)));
            if let Some((primary, current)) = drift {
                if self.decouple(model, primary, current, &mut budget) {
                    decoupling_steps += 1;
                }
            }
        }

        let current = self.finish(
            SolverReport::measure(model, &self.probe, constraints, &skipped),
            sweeps,
            budget.spent(),
            decoupling_steps,
        );
        let result = match best {
            Some((best, values)) if best.is_better_than(&current) && cap > 0 => {
                match model.apply(&values) {
                    Ok(()) => {
                        debug!(restored = values.len(), "restored best parameter state");
                        self.finish(best, sweeps, budget.spent() + 1, decoupling_steps)
                    }
                    Err(e) => {
                        warn!(error = %e, "could not restore best parameter state");
                        current
                    }
                }
            }
            _ => current,
        };
        info!(
            converged = result.converged,
            deformations = result.deformations,
            "shape solve finished without joint convergence"
        );
        Ok(result)
    }

    /// Check that a constraint can be measured and searched at all.
    fn resolve<M: ShapeModel + ?Sized>(&self, model: &M, constraint: &Constraint) -> Option<String> {
        let reason = match self.probe.measure(model, &constraint.measurement) {
            Err(e) => e.to_string(),
            Ok(_) => match model.parameter(&constraint.parameter) {
                Err(e) => e.to_string(),
                Ok(param) => match search_bounds(&param, constraint.search_bounds) {
                    Err(reason) => reason,
                    Ok(_) => return None,
                },
            },
        };
        warn!(
            measurement = %constraint.measurement,
            parameter = %constraint.parameter,
            %reason,
            "skipping constraint"
        );
        Some(reason)
    }

    /// Bisect one constraint's parameter unless it is already satisfied.
    fn solve_constraint<M: ShapeModel + ?Sized>(
        &self,
        model: &mut M,
        constraint: &Constraint,
        budget: &mut DeformationBudget,
    ) -> Result<(), String> {
        let current = self
            .probe
            .measure(model, &constraint.measurement)
            .map_err(|e| e.to_string())?;
        if constraint.is_satisfied_by(current) {
            debug!(measurement = %constraint.measurement, current, "already within tolerance");
            return Ok(());
        }

        let param = model
            .parameter(&constraint.parameter)
            .map_err(|e| e.to_string())?;
        let bounds = search_bounds(&param, constraint.search_bounds)?;
        let max_iterations = budget.grant(self.config.inner_iterations(&constraint.measurement));
        if max_iterations == 0 {
            return Ok(());
        }
        let tolerance = if self.config.is_primary(&constraint.measurement) {
            constraint.tolerance * self.config.primary_tolerance_scale
        } else {
            constraint.tolerance
        };

        let mut evaluations = 0;
        let outcome = bisect(
            |value| {
                evaluations += 1;
                self.probe
                    .apply_and_measure(model, &constraint.parameter, value, &constraint.measurement)
                    .map(|snapshot| snapshot.measured)
            },
            constraint.target,
            bounds,
            &BisectionConfig {
                tolerance,
                max_iterations,
            },
        );
        budget.record(evaluations);

        let solution = outcome.map_err(|e| e.to_string())?;
        info!(
            measurement = %constraint.measurement,
            value = solution.value,
            error = solution.error,
            evaluations = solution.evaluations,
            converged = solution.converged,
            "constraint searched"
        );
        Ok(())
    }

    /// Nudge the first available decoupling axis toward the primary target.
    /// Returns whether the model was changed.
    #[instrument(skip(self, model, primary, budget), fields(measurement = %primary.measurement))]
    fn decouple<M: ShapeModel + ?Sized>(
        &self,
        model: &mut M,
        primary: &Constraint,
        current: f64,
        budget: &mut DeformationBudget,
    ) -> bool {
        let direction = (primary.target - current).signum();
        for axis in &self.config.decoupling {
            let param = match model.parameter(&axis.parameter) {
                Ok(p) => p,
                Err(e) => {
                    debug!(error = %e, "decoupling axis not on model");
                    continue;
                }
            };
            let next = param.clamp(param.value + direction * axis.step_fraction * param.span());
            if next == param.value {
                debug!(parameter = %axis.parameter, "decoupling axis at its bound");
                continue;
            }
            if !budget.try_spend() {
                return false;
            }
            return match model.apply_value(&axis.parameter, next) {
                Ok(applied) => {
                    info!(parameter = %axis.parameter, from = param.value, to = applied, "decoupling nudge");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "decoupling nudge failed");
                    false
                }
            };
        }
        false
    }

    /// Current values of every parameter the solve may touch.
    fn snapshot<M: ShapeModel + ?Sized>(
        &self,
        model: &M,
        constraints: &[Constraint],
    ) -> Vec<ParameterAssignment> {
        let names: Vec<&str> = constraints
            .iter()
            .map(|c| c.parameter.as_str())
            .chain(self.config.decoupling.iter().map(|a| a.parameter.as_str()))
            .collect();
        let mut values = model.snapshot(&names);
        let mut seen = std::collections::HashSet::new();
        values.retain(|a| seen.insert(a.name.clone()));
        values
    }

    fn finish(
        &self,
        mut report: SolverReport,
        sweeps: usize,
        deformations: usize,
        decoupling_steps: usize,
    ) -> SolverReport {
        report.outer_iterations = sweeps;
        report.deformations = deformations;
        report.decoupling_steps = decoupling_steps;
        report
    }
}

/// Constraint bounds intersected with the parameter range.
fn search_bounds(param: &ShapeParameter, explicit: Option<(f64, f64)>) -> Result<(f64, f64), String> {
    let (min, max) = param.bounds();
    let (low, high) = match explicit {
        Some((lo, hi)) => (lo.max(min), hi.min(max)),
        None => (min, max),
    };
    if low <= high {
        Ok((low, high))
    } else {
        Err(format!(
            "search bounds ({low}, {high}) do not intersect range of {} [{min}, {max}]",
            param.name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecouplingAxis;
    use crate::measure::LandmarkTable;
    use body_model::{BlendShapeModel, Modifier};
    use body_types::Unit;

    /// One segment along Y, stretched by "grow".
    fn rod() -> BlendShapeModel {
        BlendShapeModel::new(&[[0.0, 0.0, 0.0], [0.0, 2.0, 0.0]])
            .with_modifier(Modifier::symmetric("grow").translate(&[1], [0.0, 1.0, 0.0]))
            .unwrap()
    }

    fn solver(config: SolverConfig) -> CoordinateDescentSolver {
        let table = LandmarkTable::new().with_chain("rod", vec![0, 1]);
        CoordinateDescentSolver::new(MeasurementProbe::new(table, Unit::Centimeters), config).unwrap()
    }

    #[test]
    fn test_single_constraint_converges() {
        let mut model = rod();
        let set = ConstraintSet::new().push(Constraint::new("rod", "grow", 27.0, 0.1));
        let report = solver(SolverConfig::default()).solve(&mut model, &set).unwrap();
        assert!(report.converged);
        assert_eq!(report.outer_iterations, 1);
        assert!(report.get("rod").unwrap().error().unwrap() < 0.1);
        assert_eq!(report.deformations as u64, model.deformation_count());
    }

    #[test]
    fn test_already_satisfied_needs_no_deformation() {
        let mut model = rod();
        let set = ConstraintSet::new().push(Constraint::new("rod", "grow", 20.0, 0.5));
        let report = solver(SolverConfig::default()).solve(&mut model, &set).unwrap();
        assert!(report.converged);
        assert_eq!(report.deformations, 0);
        assert_eq!(model.deformation_count(), 0);
    }

    #[test]
    fn test_invalid_constraint_rejected_before_touching_model() {
        let mut model = rod();
        let set = ConstraintSet::new().push(Constraint::new("rod", "grow", 27.0, -1.0));
        let err = solver(SolverConfig::default()).solve(&mut model, &set).unwrap_err();
        assert!(matches!(err, SolverError::InvalidConstraint(_)));
        assert_eq!(model.deformation_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig {
            max_outer_iterations: 0,
            ..SolverConfig::default()
        };
        let table = LandmarkTable::new();
        assert!(CoordinateDescentSolver::new(MeasurementProbe::new(table, Unit::Native), config).is_err());
    }

    #[test]
    fn test_explicit_search_bounds_are_respected() {
        let mut model = rod();
        // Reaching 27 needs grow = 0.7, outside the allowed window.
        let set = ConstraintSet::new()
            .push(Constraint::new("rod", "grow", 27.0, 0.1).with_search_bounds(-1.0, 0.25));
        let report = solver(SolverConfig::fast()).solve(&mut model, &set).unwrap();
        assert!(!report.converged);
        assert!(model.parameter("grow").unwrap().value <= 0.25);
    }

    #[test]
    fn test_disjoint_search_bounds_skip() {
        let mut model = rod();
        let set = ConstraintSet::new()
            .push(Constraint::new("rod", "grow", 27.0, 0.1).with_search_bounds(2.0, 3.0));
        let report = solver(SolverConfig::default()).solve(&mut model, &set).unwrap();
        assert!(report.get("rod").unwrap().is_skipped());
        assert_eq!(model.deformation_count(), 0);
    }

    /// `rod` plus a decoupling axis resting at its upper bound ("stiff")
    /// and one that lengthens the rod ("lift").
    fn rod_with_axes() -> BlendShapeModel {
        rod()
            .with_modifier(Modifier::new("stiff", 0.0, 1.0, 1.0))
            .unwrap()
            .with_modifier(Modifier::symmetric("lift").translate(&[1], [0.0, 0.5, 0.0]))
            .unwrap()
    }

    fn rod_primary(max_outer_iterations: usize, decoupling: Vec<DecouplingAxis>) -> SolverConfig {
        SolverConfig {
            max_outer_iterations,
            primary_measurement: "rod".into(),
            decoupling,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_no_nudge_without_primary_constraint() {
        let mut model = rod_with_axes();
        let config = SolverConfig {
            decoupling: vec![DecouplingAxis::new("lift", 0.1)],
            ..SolverConfig::default()
        };
        // Unreachable, and "rod" is not the primary measurement.
        let set = ConstraintSet::new().push(Constraint::new("rod", "grow", 40.0, 0.5));
        let report = solver(config).solve(&mut model, &set).unwrap();
        assert!(!report.converged);
        assert_eq!(report.decoupling_steps, 0);
        assert_eq!(model.parameter("lift").unwrap().value, 0.0);
    }

    #[test]
    fn test_axis_at_bound_falls_through_to_next() {
        let mut model = rod_with_axes();
        let config = rod_primary(
            3,
            vec![DecouplingAxis::new("stiff", 0.1), DecouplingAxis::new("lift", 0.1)],
        );
        let set = ConstraintSet::new().push(Constraint::new("rod", "grow", 40.0, 0.5));
        let report = solver(config).solve(&mut model, &set).unwrap();
        // Nudges after sweeps 1 and 2, none after the last.
        assert_eq!(report.decoupling_steps, 2);
        assert_eq!(model.parameter("stiff").unwrap().value, 1.0);
        assert!((model.parameter("lift").unwrap().value - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_axis_stops_counting_nudges() {
        let mut model = rod_with_axes();
        let config = rod_primary(4, vec![DecouplingAxis::new("lift", 0.5)]);
        let set = ConstraintSet::new().push(Constraint::new("rod", "grow", 40.0, 0.5));
        let report = solver(config).solve(&mut model, &set).unwrap();
        // The first nudge reaches max; later ones have nowhere to go.
        assert_eq!(report.decoupling_steps, 1);
        assert_eq!(model.parameter("lift").unwrap().value, 1.0);
        assert!(!report.converged);
        assert_eq!(report.deformations as u64, model.deformation_count());
    }

    #[test]
    fn test_nothing_measurable_is_not_converged() {
        let mut model = rod();
        let set = ConstraintSet::new().push(Constraint::new("rod", "missing", 27.0, 0.5));
        let report = solver(SolverConfig::default()).solve(&mut model, &set).unwrap();
        assert!(!report.converged);
        assert_eq!(report.outer_iterations, 0);
        assert_eq!(model.deformation_count(), 0);
    }

    #[test]
    fn test_search_bounds_intersection() {
        let p = ShapeParameter::new("grow", -1.0, 1.0, 0.0);
        assert_eq!(search_bounds(&p, None), Ok((-1.0, 1.0)));
        assert_eq!(search_bounds(&p, Some((0.0, 4.0))), Ok((0.0, 1.0)));
        assert!(search_bounds(&p, Some((1.5, 4.0))).is_err());
    }
}
