//! Solver configuration and named presets.

use body_types::{Constraint, names};
use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// A secondary parameter nudged to counter drift in the primary measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecouplingAxis {
    pub parameter: String,
    /// Step size as a fraction of the parameter's range.
    pub step_fraction: f64,
}

impl DecouplingAxis {
    pub fn new(parameter: impl Into<String>, step_fraction: f64) -> Self {
        Self {
            parameter: parameter.into(),
            step_fraction,
        }
    }
}

/// Configuration for the coordinate-descent solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Full sweeps over all constraints.
    pub max_outer_iterations: usize,
    /// Measurement whose drift triggers decoupling. Only a constraint on
    /// this measurement gets the primary search budget and tolerance scale.
    pub primary_measurement: String,
    /// Bisection budget for the primary constraint.
    pub primary_inner_iterations: usize,
    /// Bisection budget for every other constraint.
    pub secondary_inner_iterations: usize,
    /// Multiplier on the primary constraint's tolerance inside its own
    /// bisection. Values above 1 let the height search stop early.
    pub primary_tolerance_scale: f64,
    /// Candidate decoupling parameters; the first one present on the model
    /// is used.
    pub decoupling: Vec<DecouplingAxis>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_outer_iterations: 8,
            primary_measurement: names::HEIGHT.to_string(),
            primary_inner_iterations: 20,
            secondary_inner_iterations: 20,
            primary_tolerance_scale: 1.0,
            decoupling: vec![DecouplingAxis::new(names::TORSO_SCALE_MODIFIER, 0.1)],
        }
    }
}

impl SolverConfig {
    /// Few sweeps with short searches.
    pub fn fast() -> Self {
        Self {
            max_outer_iterations: 3,
            primary_inner_iterations: 12,
            secondary_inner_iterations: 12,
            ..Self::default()
        }
    }

    /// Many sweeps with long searches.
    pub fn thorough() -> Self {
        Self {
            max_outer_iterations: 20,
            primary_inner_iterations: 40,
            secondary_inner_iterations: 30,
            ..Self::default()
        }
    }

    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SolverError> {
        let config: Self = serde_json::from_str(json).map_err(|e| SolverError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        let invalid = |reason: String| -> Result<(), SolverError> {
            Err(SolverError::InvalidConfig { reason })
        };
        if self.max_outer_iterations == 0 {
            return invalid("max_outer_iterations must be at least 1".into());
        }
        if self.primary_inner_iterations == 0 || self.secondary_inner_iterations == 0 {
            return invalid("inner iteration caps must be at least 1".into());
        }
        if !(self.primary_tolerance_scale > 0.0) {
            return invalid(format!(
                "primary_tolerance_scale must be positive, got {}",
                self.primary_tolerance_scale
            ));
        }
        if let Some(axis) = self
            .decoupling
            .iter()
            .find(|a| !(a.step_fraction > 0.0 && a.step_fraction <= 1.0))
        {
            return invalid(format!(
                "decoupling step for {} must be in (0, 1], got {}",
                axis.parameter, axis.step_fraction
            ));
        }
        Ok(())
    }

    pub fn is_primary(&self, measurement: &str) -> bool {
        measurement == self.primary_measurement
    }

    /// Bisection cap for a constraint on `measurement`.
    pub fn inner_iterations(&self, measurement: &str) -> usize {
        if self.is_primary(measurement) {
            self.primary_inner_iterations
        } else {
            self.secondary_inner_iterations
        }
    }

    /// Most deformations a solve over `constraints` may perform.
    pub fn deformation_cap(&self, constraints: &[Constraint]) -> usize {
        let per_sweep = constraints
            .iter()
            .map(|c| self.inner_iterations(&c.measurement))
            .sum::<usize>();
        self.max_outer_iterations * per_sweep
    }
}
