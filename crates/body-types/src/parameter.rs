use serde::{Deserialize, Serialize};

/// A named, bounded scalar control exposed by a shape model.
///
/// This is a snapshot: the model owns the live value, and writing it goes
/// through the model so that the mesh is re-deformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeParameter {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

impl ShapeParameter {
    pub fn new(name: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        let mut param = Self {
            name: name.into(),
            min,
            max,
            value,
        };
        param.value = param.clamp(value);
        param
    }

    /// Clamp a candidate value into `[min, max]`. NaN maps to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Width of the value range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// A requested parameter value, applied through `ShapeModel::apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAssignment {
    pub name: String,
    pub value: f64,
}

impl ParameterAssignment {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_into_range() {
        let p = ShapeParameter::new("torso", -1.0, 1.0, 0.0);
        assert_eq!(p.clamp(2.5), 1.0);
        assert_eq!(p.clamp(-3.0), -1.0);
        assert_eq!(p.clamp(0.25), 0.25);
        assert_eq!(p.clamp(f64::NAN), -1.0);
    }

    #[test]
    fn test_new_clamps_initial_value() {
        let p = ShapeParameter::new("height", 0.0, 1.0, 1.7);
        assert_eq!(p.value, 1.0);
        assert_eq!(p.span(), 1.0);
    }
}
