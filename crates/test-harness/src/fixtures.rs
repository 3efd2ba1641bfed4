//! Synthetic humanoid models with hand-computable measurements.
//!
//! The humanoid stands on the XZ plane with Y up, modelled in decimeters so
//! a centimeter probe reads ten times the coordinate distance. At rest it
//! measures 170 tall with limbs of 30 / 25 / 45 / 40.
//!
//! Coupling is explicit: the leg modifiers lift everything above them
//! (including the crown), the upper-arm modifier drags the wrist with the
//! elbow, and the torso modifier lifts the shoulders and crown only.

use body_model::{BlendShapeModel, ModelError, Modifier};
use body_solver::{Axis, LandmarkTable, MeasurementProbe};
use body_types::{Unit, names};

pub const CROWN: usize = 0;
pub const HEEL: usize = 1;
pub const SHOULDER: usize = 2;
pub const ELBOW: usize = 3;
pub const WRIST: usize = 4;
pub const HIP: usize = 5;
pub const KNEE: usize = 6;
pub const ANKLE: usize = 7;

/// Rest-pose measurements in centimeters.
pub const REST_HEIGHT: f64 = 170.0;
pub const REST_UPPER_ARM: f64 = 30.0;
pub const REST_LOWER_ARM: f64 = 25.0;
pub const REST_UPPER_LEG: f64 = 45.0;
pub const REST_LOWER_LEG: f64 = 40.0;

const BASE: [[f64; 3]; 8] = [
    [0.0, 17.0, 0.0], // crown
    [0.0, 0.0, 0.0],  // heel
    [2.0, 14.0, 0.0], // shoulder
    [2.0, 11.0, 0.0], // elbow
    [2.0, 8.5, 0.0],  // wrist
    [1.0, 9.0, 0.0],  // hip
    [1.0, 4.5, 0.0],  // knee
    [1.0, 0.5, 0.0],  // ankle
];

const UP: [f64; 3] = [0.0, 1.0, 0.0];
const DOWN: [f64; 3] = [0.0, -1.0, 0.0];

fn limb_modifiers() -> Vec<Modifier> {
    vec![
        Modifier::symmetric(names::UPPER_ARM_MODIFIER).translate(&[ELBOW, WRIST], DOWN),
        Modifier::symmetric(names::LOWER_ARM_MODIFIER).translate(&[WRIST], DOWN),
        Modifier::symmetric(names::UPPER_LEG_MODIFIER)
            .translate(&[HIP, SHOULDER, ELBOW, WRIST, CROWN], UP),
        Modifier::symmetric(names::LOWER_LEG_MODIFIER)
            .translate(&[KNEE, HIP, SHOULDER, ELBOW, WRIST, CROWN], UP),
    ]
}

/// Direct height control: moves the crown by up to 20 cm either way.
fn height_modifier() -> Modifier {
    Modifier::new(names::HEIGHT_MODIFIER, 0.0, 1.0, 0.5).translate(&[CROWN], [0.0, 2.0, 0.0])
}

/// Torso stretch: lifts the upper body by up to 5 cm.
fn torso_modifier() -> Modifier {
    Modifier::symmetric(names::TORSO_SCALE_MODIFIER)
        .translate(&[SHOULDER, ELBOW, WRIST, CROWN], [0.0, 0.5, 0.0])
}

fn build(modifiers: Vec<Modifier>) -> Result<BlendShapeModel, ModelError> {
    let mut model = BlendShapeModel::new(&BASE);
    for m in modifiers {
        model.add_modifier(m)?;
    }
    Ok(model)
}

/// Humanoid with height, limb, and torso modifiers.
pub fn humanoid() -> Result<BlendShapeModel, ModelError> {
    let mut modifiers = vec![height_modifier()];
    modifiers.extend(limb_modifiers());
    modifiers.push(torso_modifier());
    build(modifiers)
}

/// Humanoid with no decoupling axis.
pub fn humanoid_without_torso() -> Result<BlendShapeModel, ModelError> {
    let mut modifiers = vec![height_modifier()];
    modifiers.extend(limb_modifiers());
    build(modifiers)
}

/// Humanoid with limbs only: no height or torso modifier.
pub fn humanoid_without_height() -> Result<BlendShapeModel, ModelError> {
    build(limb_modifiers())
}

/// Humanoid whose height modifier scales every vertex vertically by up to
/// 20%, so changing height also changes every limb measurement.
pub fn humanoid_scaled() -> Result<BlendShapeModel, ModelError> {
    let scale: Vec<(usize, [f64; 3])> = BASE
        .iter()
        .enumerate()
        .map(|(i, p)| (i, [0.0, 0.2 * p[1], 0.0]))
        .collect();
    let shrink = scale.iter().map(|&(i, o)| (i, [0.0, -o[1], 0.0])).collect();
    let mut modifiers = vec![
        Modifier::new(names::HEIGHT_MODIFIER, 0.0, 1.0, 0.5)
            .incr(scale)
            .decr(shrink),
    ];
    modifiers.extend(limb_modifiers());
    modifiers.push(torso_modifier());
    build(modifiers)
}

/// Landmarks for the humanoid: height as vertical extent, limbs as
/// single segments.
pub fn humanoid_table() -> LandmarkTable {
    LandmarkTable::new()
        .with_extent(names::HEIGHT, Axis::Y)
        .with_chain(names::UPPER_ARM, vec![SHOULDER, ELBOW])
        .with_chain(names::LOWER_ARM, vec![ELBOW, WRIST])
        .with_chain(names::UPPER_LEG, vec![HIP, KNEE])
        .with_chain(names::LOWER_LEG, vec![KNEE, ANKLE])
}

/// Centimeter probe over [`humanoid_table`].
pub fn humanoid_probe() -> MeasurementProbe {
    MeasurementProbe::new(humanoid_table(), Unit::Centimeters)
}
