//! Well-known measurement and modifier names for the default human model.

/// Overall body height, measured as the vertical extent of the mesh.
pub const HEIGHT: &str = "height";
pub const UPPER_ARM: &str = "upperarm-length";
pub const LOWER_ARM: &str = "lowerarm-length";
pub const UPPER_LEG: &str = "upperleg-height";
pub const LOWER_LEG: &str = "lowerleg-height";

/// Measurements in solve priority order. Height comes first because the
/// limb modifiers perturb it through shared shape modes.
pub const PRIORITY_ORDER: [&str; 5] = [HEIGHT, UPPER_ARM, LOWER_ARM, UPPER_LEG, LOWER_LEG];

pub const HEIGHT_MODIFIER: &str = "macrodetails-height/Height";
pub const UPPER_ARM_MODIFIER: &str = "measure/measure-upperarm-length-decr|incr";
pub const LOWER_ARM_MODIFIER: &str = "measure/measure-lowerarm-length-decr|incr";
pub const UPPER_LEG_MODIFIER: &str = "measure/measure-upperleg-height-decr|incr";
pub const LOWER_LEG_MODIFIER: &str = "measure/measure-lowerleg-height-decr|incr";

/// Vertical torso scale, the default axis for height decoupling.
pub const TORSO_SCALE_MODIFIER: &str = "torso/torso-scale-vert-decr|incr";

/// Priority rank of a measurement name, `None` for custom measurements.
pub fn priority_rank(measurement: &str) -> Option<usize> {
    PRIORITY_ORDER.iter().position(|m| *m == measurement)
}

/// Default modifier driving a well-known measurement.
pub fn default_modifier(measurement: &str) -> Option<&'static str> {
    match measurement {
        HEIGHT => Some(HEIGHT_MODIFIER),
        UPPER_ARM => Some(UPPER_ARM_MODIFIER),
        LOWER_ARM => Some(LOWER_ARM_MODIFIER),
        UPPER_LEG => Some(UPPER_LEG_MODIFIER),
        LOWER_LEG => Some(LOWER_LEG_MODIFIER),
        _ => None,
    }
}
