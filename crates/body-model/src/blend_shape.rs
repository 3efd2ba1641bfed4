//! Linear target-blending body model.
//!
//! Each modifier carries two sparse vertex-offset targets: `decr`, blended in
//! as the value moves from its default toward `min`, and `incr`, blended in
//! as it moves toward `max`. The deformed mesh is the base mesh plus the
//! weighted sum of every modifier's active target.

use std::collections::HashMap;

use nalgebra::Vector3;
use tracing::debug;

use crate::traits::ShapeModel;
use crate::types::*;

/// Sparse per-vertex displacement: (vertex index, offset).
pub type TargetOffsets = Vec<(usize, [f64; 3])>;

/// A named shape control with decrease/increase targets.
#[derive(Debug, Clone)]
pub struct Modifier {
    name: String,
    min: f64,
    max: f64,
    default: f64,
    value: f64,
    decr: TargetOffsets,
    incr: TargetOffsets,
}

impl Modifier {
    /// A modifier with range `[min, max]` resting at `default`.
    pub fn new(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            default,
            value: default,
            decr: Vec::new(),
            incr: Vec::new(),
        }
    }

    /// The usual `decr|incr` modifier: range `[-1, 1]`, default 0.
    pub fn symmetric(name: impl Into<String>) -> Self {
        Self::new(name, -1.0, 1.0, 0.0)
    }

    /// Target fully applied at `min`.
    pub fn decr(mut self, offsets: TargetOffsets) -> Self {
        self.decr = offsets;
        self
    }

    /// Target fully applied at `max`.
    pub fn incr(mut self, offsets: TargetOffsets) -> Self {
        self.incr = offsets;
        self
    }

    /// Same offset applied to every listed vertex, mirrored for `decr`.
    pub fn translate(self, vertices: &[usize], offset: [f64; 3]) -> Self {
        let neg = [-offset[0], -offset[1], -offset[2]];
        self.decr(vertices.iter().map(|&v| (v, neg)).collect())
            .incr(vertices.iter().map(|&v| (v, offset)).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Blend weights `(decr, incr)` for the current value.
    fn weights(&self) -> (f64, f64) {
        if self.value < self.default && self.default > self.min {
            ((self.default - self.value) / (self.default - self.min), 0.0)
        } else if self.value > self.default && self.max > self.default {
            (0.0, (self.value - self.default) / (self.max - self.default))
        } else {
            (0.0, 0.0)
        }
    }

    fn as_parameter(&self) -> ShapeParameter {
        ShapeParameter {
            name: self.name.clone(),
            min: self.min,
            max: self.max,
            value: self.value,
        }
    }

    fn validate(&self, vertex_count: usize) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidModifier {
            name: self.name.clone(),
            reason,
        };
        if !(self.min <= self.default && self.default <= self.max) {
            return Err(invalid(format!(
                "default {} outside range [{}, {}]",
                self.default, self.min, self.max
            )));
        }
        for (index, _) in self.decr.iter().chain(self.incr.iter()) {
            if *index >= vertex_count {
                return Err(invalid(format!(
                    "target vertex {} out of range (mesh has {} vertices)",
                    index, vertex_count
                )));
            }
        }
        Ok(())
    }
}

/// Body model deformed by linear blending of modifier targets.
///
/// Every successful `apply` re-deforms the whole mesh and increments the
/// deformation counter.
#[derive(Debug, Clone)]
pub struct BlendShapeModel {
    base: Vec<Vector3<f64>>,
    coords: Vec<Vector3<f64>>,
    modifiers: Vec<Modifier>,
    index: HashMap<String, usize>,
    deformations: u64,
}

impl BlendShapeModel {
    /// Create a model from base vertex positions, with no modifiers.
    pub fn new(base: &[[f64; 3]]) -> Self {
        let base: Vec<Vector3<f64>> = base.iter().map(|p| Vector3::from(*p)).collect();
        Self {
            coords: base.clone(),
            base,
            modifiers: Vec::new(),
            index: HashMap::new(),
            deformations: 0,
        }
    }

    /// Register a modifier. Replaces an existing modifier with the same name.
    /// Does not count as a deformation.
    pub fn add_modifier(&mut self, modifier: Modifier) -> Result<(), ModelError> {
        modifier.validate(self.base.len())?;
        match self.index.get(modifier.name()) {
            Some(&i) => self.modifiers[i] = modifier,
            None => {
                self.index
                    .insert(modifier.name().to_string(), self.modifiers.len());
                self.modifiers.push(modifier);
            }
        }
        self.deform();
        Ok(())
    }

    /// Chainable form of `add_modifier`.
    pub fn with_modifier(mut self, modifier: Modifier) -> Result<Self, ModelError> {
        self.add_modifier(modifier)?;
        Ok(self)
    }

    /// Number of deformations triggered through `apply` since creation or
    /// the last reset.
    pub fn deformation_count(&self) -> u64 {
        self.deformations
    }

    pub fn reset_deformation_count(&mut self) {
        self.deformations = 0;
    }

    fn deform(&mut self) {
        self.coords.clone_from(&self.base);
        for modifier in &self.modifiers {
            let (wd, wi) = modifier.weights();
            if wd > 0.0 {
                blend(&mut self.coords, &modifier.decr, wd);
            }
            if wi > 0.0 {
                blend(&mut self.coords, &modifier.incr, wi);
            }
        }
    }
}

fn blend(coords: &mut [Vector3<f64>], target: &TargetOffsets, weight: f64) {
    for (index, offset) in target {
        coords[*index] += Vector3::from(*offset) * weight;
    }
}

impl ShapeModel for BlendShapeModel {
    fn parameter(&self, name: &str) -> Result<ShapeParameter, ModelError> {
        self.index
            .get(name)
            .map(|&i| self.modifiers[i].as_parameter())
            .ok_or_else(|| ModelError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    fn parameter_names(&self) -> Vec<String> {
        self.modifiers.iter().map(|m| m.name.clone()).collect()
    }

    fn apply(&mut self, assignments: &[ParameterAssignment]) -> Result<(), ModelError> {
        let mut resolved = Vec::with_capacity(assignments.len());
        for a in assignments {
            let i = *self
                .index
                .get(&a.name)
                .ok_or_else(|| ModelError::ParameterNotFound {
                    name: a.name.clone(),
                })?;
            resolved.push((i, a.value));
        }
        for (i, value) in resolved {
            let m = &mut self.modifiers[i];
            m.value = m.as_parameter().clamp(value);
        }
        self.deform();
        self.deformations += 1;
        debug!(
            count = assignments.len(),
            deformations = self.deformations,
            "blend-shape model re-deformed"
        );
        Ok(())
    }

    fn vertex_position(&self, index: usize) -> Result<[f64; 3], ModelError> {
        self.coords
            .get(index)
            .map(|v| [v.x, v.y, v.z])
            .ok_or(ModelError::VertexOutOfRange {
                index,
                count: self.coords.len(),
            })
    }

    fn vertex_count(&self) -> usize {
        self.coords.len()
    }
}
