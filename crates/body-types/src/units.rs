use serde::{Deserialize, Serialize};

/// Inches per centimeter.
pub const INCHES_PER_CM: f64 = 0.393700787;

/// Length unit of reported measurements.
///
/// Model coordinates are decimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Native,
    #[default]
    Centimeters,
    Inches,
}

impl Unit {
    /// Multiplier from model units to this unit.
    pub fn scale(self) -> f64 {
        match self {
            Unit::Native => 1.0,
            Unit::Centimeters => 10.0,
            Unit::Inches => 10.0 * INCHES_PER_CM,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Native => "dm",
            Unit::Centimeters => "cm",
            Unit::Inches => "in",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales() {
        assert_eq!(Unit::Native.scale(), 1.0);
        assert_eq!(Unit::Centimeters.scale(), 10.0);
        assert!((Unit::Inches.scale() - 3.93700787).abs() < 1e-12);
        assert_eq!(Unit::default(), Unit::Centimeters);
    }
}
