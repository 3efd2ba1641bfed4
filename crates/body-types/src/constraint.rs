use serde::{Deserialize, Serialize};

use crate::names;

/// Errors from malformed constraints.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstraintError {
    #[error("constraint {measurement}: tolerance must be positive, got {tolerance}")]
    NonPositiveTolerance { measurement: String, tolerance: f64 },

    #[error("constraint {measurement}: target must be finite, got {target}")]
    NonFiniteTarget { measurement: String, target: f64 },

    #[error("constraint {measurement}: empty search bounds ({low}, {high})")]
    EmptyBounds {
        measurement: String,
        low: f64,
        high: f64,
    },
}

/// A target value for one measurement, driven by one shape parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Key into the landmark table.
    pub measurement: String,
    /// Name of the shape parameter searched to satisfy this constraint.
    pub parameter: String,
    /// Target measurement in the probe's unit.
    pub target: f64,
    /// Maximum acceptable absolute error.
    pub tolerance: f64,
    /// Optional sub-range to search, intersected with the parameter range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_bounds: Option<(f64, f64)>,
}

impl Constraint {
    pub fn new(
        measurement: impl Into<String>,
        parameter: impl Into<String>,
        target: f64,
        tolerance: f64,
    ) -> Self {
        Self {
            measurement: measurement.into(),
            parameter: parameter.into(),
            target,
            tolerance,
            search_bounds: None,
        }
    }

    pub fn with_search_bounds(mut self, low: f64, high: f64) -> Self {
        self.search_bounds = Some((low, high));
        self
    }

    /// Check the invariants: finite target, `tolerance > 0`, ordered bounds.
    pub fn validate(&self) -> Result<(), ConstraintError> {
        if !self.target.is_finite() {
            return Err(ConstraintError::NonFiniteTarget {
                measurement: self.measurement.clone(),
                target: self.target,
            });
        }
        if !(self.tolerance > 0.0) {
            return Err(ConstraintError::NonPositiveTolerance {
                measurement: self.measurement.clone(),
                tolerance: self.tolerance,
            });
        }
        if let Some((low, high)) = self.search_bounds {
            if !(low <= high) {
                return Err(ConstraintError::EmptyBounds {
                    measurement: self.measurement.clone(),
                    low,
                    high,
                });
            }
        }
        Ok(())
    }

    /// Whether a measured value satisfies this constraint.
    pub fn is_satisfied_by(&self, measured: f64) -> bool {
        (measured - self.target).abs() < self.tolerance
    }
}

/// Constraints in solve priority order.
///
/// Well-known measurements always occupy their canonical slot (height,
/// upper arm, lower arm, upper leg, lower leg); custom measurements follow
/// in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five standard body constraints with the default modifiers.
    pub fn anthropometric(
        height: f64,
        upper_arm: f64,
        lower_arm: f64,
        upper_leg: f64,
        lower_leg: f64,
        tolerance: f64,
    ) -> Self {
        Self::new()
            .height(height, tolerance)
            .upper_arm(upper_arm, tolerance)
            .lower_arm(lower_arm, tolerance)
            .upper_leg(upper_leg, tolerance)
            .lower_leg(lower_leg, tolerance)
    }

    pub fn height(self, target: f64, tolerance: f64) -> Self {
        self.standard(names::HEIGHT, target, tolerance)
    }

    pub fn upper_arm(self, target: f64, tolerance: f64) -> Self {
        self.standard(names::UPPER_ARM, target, tolerance)
    }

    pub fn lower_arm(self, target: f64, tolerance: f64) -> Self {
        self.standard(names::LOWER_ARM, target, tolerance)
    }

    pub fn upper_leg(self, target: f64, tolerance: f64) -> Self {
        self.standard(names::UPPER_LEG, target, tolerance)
    }

    pub fn lower_leg(self, target: f64, tolerance: f64) -> Self {
        self.standard(names::LOWER_LEG, target, tolerance)
    }

    fn standard(mut self, measurement: &str, target: f64, tolerance: f64) -> Self {
        let parameter = names::default_modifier(measurement).unwrap_or(measurement);
        self.insert(Constraint::new(measurement, parameter, target, tolerance));
        self
    }

    /// Insert a constraint at its priority slot, replacing any existing
    /// constraint on the same measurement.
    pub fn insert(&mut self, constraint: Constraint) {
        self.constraints
            .retain(|c| c.measurement != constraint.measurement);
        let pos = match names::priority_rank(&constraint.measurement) {
            Some(rank) => self
                .constraints
                .iter()
                .position(|c| match names::priority_rank(&c.measurement) {
                    Some(other) => other > rank,
                    None => true,
                })
                .unwrap_or(self.constraints.len()),
            None => self.constraints.len(),
        };
        self.constraints.insert(pos, constraint);
    }

    /// Append a custom constraint (chainable form of `insert`).
    pub fn push(mut self, constraint: Constraint) -> Self {
        self.insert(constraint);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn as_slice(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn get(&self, measurement: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.measurement == measurement)
    }

    /// Validate every constraint.
    pub fn validate(&self) -> Result<(), ConstraintError> {
        self.constraints.iter().try_for_each(Constraint::validate)
    }
}

impl From<Vec<Constraint>> for ConstraintSet {
    fn from(constraints: Vec<Constraint>) -> Self {
        constraints
            .into_iter()
            .fold(ConstraintSet::new(), |set, c| set.push(c))
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}
