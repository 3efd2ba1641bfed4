use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintSet;

/// Accepted range for the direct height parameter.
pub const HEIGHT_RANGE: (f64, f64) = (0.0, 1.0);
/// Accepted range for arm segment lengths, in centimeters.
pub const ARM_RANGE_CM: (f64, f64) = (10.0, 50.0);
/// Accepted range for leg segment lengths, in centimeters.
pub const LEG_RANGE_CM: (f64, f64) = (20.0, 80.0);

/// Errors from out-of-range body requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("tolerance must be positive, got {0}")]
    NonPositiveTolerance(f64),
}

/// The measurements a caller asks for.
///
/// `height` is the direct value of the height modifier, not a length.
/// Limb lengths are in centimeters. `height_cm` optionally adds a measured
/// height constraint on top of the direct setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRequest {
    pub height: f64,
    pub upper_arm_cm: f64,
    pub lower_arm_cm: f64,
    pub upper_leg_cm: f64,
    pub lower_leg_cm: f64,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default = "default_tolerance")]
    pub tolerance_cm: f64,
}

fn default_tolerance() -> f64 {
    0.5
}

impl BodyRequest {
    pub fn new(height: f64, upper_arm: f64, lower_arm: f64, upper_leg: f64, lower_leg: f64) -> Self {
        Self {
            height,
            upper_arm_cm: upper_arm,
            lower_arm_cm: lower_arm,
            upper_leg_cm: upper_leg,
            lower_leg_cm: lower_leg,
            height_cm: None,
            tolerance_cm: default_tolerance(),
        }
    }

    pub fn with_height_cm(mut self, height_cm: f64) -> Self {
        self.height_cm = Some(height_cm);
        self
    }

    pub fn with_tolerance(mut self, tolerance_cm: f64) -> Self {
        self.tolerance_cm = tolerance_cm;
        self
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), RequestError> {
        check_range("height", self.height, HEIGHT_RANGE)?;
        check_range("upper arm length", self.upper_arm_cm, ARM_RANGE_CM)?;
        check_range("lower arm length", self.lower_arm_cm, ARM_RANGE_CM)?;
        check_range("upper leg length", self.upper_leg_cm, LEG_RANGE_CM)?;
        check_range("lower leg length", self.lower_leg_cm, LEG_RANGE_CM)?;
        if !(self.tolerance_cm > 0.0) {
            return Err(RequestError::NonPositiveTolerance(self.tolerance_cm));
        }
        Ok(())
    }

    /// Measured constraints implied by this request.
    pub fn constraints(&self) -> ConstraintSet {
        let tol = self.tolerance_cm;
        let set = ConstraintSet::new()
            .upper_arm(self.upper_arm_cm, tol)
            .lower_arm(self.lower_arm_cm, tol)
            .upper_leg(self.upper_leg_cm, tol)
            .lower_leg(self.lower_leg_cm, tol);
        match self.height_cm {
            Some(h) => set.height(h, tol),
            None => set,
        }
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), RequestError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(RequestError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
