//! Landmark-based measurements on the deformed mesh.

use std::collections::BTreeMap;

use body_model::ShapeModel;
use body_types::{Unit, names};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::MeasureError;

/// Coordinate axis of the model space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// How a measurement is read off the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Landmarks {
    /// Sum of consecutive segment lengths along a vertex polyline.
    Chain(Vec<usize>),
    /// Span of all vertices along one axis (max - min).
    Extent { axis: Axis },
}

/// Static mapping from measurement name to landmarks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkTable {
    entries: BTreeMap<String, Landmarks>,
}

impl LandmarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ruler for the default human base mesh (Y-up).
    pub fn makehuman() -> Self {
        Self::new()
            .with_extent(names::HEIGHT, Axis::Y)
            .with_chain(names::UPPER_ARM, vec![8274, 10037])
            .with_chain(names::LOWER_ARM, vec![10040, 10548])
            .with_chain(names::UPPER_LEG, vec![10970, 11230])
            .with_chain(names::LOWER_LEG, vec![11225, 12820])
    }

    pub fn with_chain(mut self, name: impl Into<String>, chain: Vec<usize>) -> Self {
        self.entries.insert(name.into(), Landmarks::Chain(chain));
        self
    }

    pub fn with_extent(mut self, name: impl Into<String>, axis: Axis) -> Self {
        self.entries.insert(name.into(), Landmarks::Extent { axis });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Landmarks> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// The result of applying one parameter value and measuring afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSnapshot {
    pub parameter: String,
    /// Value actually applied, after clamping.
    pub value: f64,
    pub measurement: String,
    pub measured: f64,
}

/// Reads scaled measurements from a model's current vertex positions.
#[derive(Debug, Clone)]
pub struct MeasurementProbe {
    table: LandmarkTable,
    unit_scale: f64,
}

impl MeasurementProbe {
    pub fn new(table: LandmarkTable, unit: Unit) -> Self {
        Self::with_scale(table, unit.scale())
    }

    pub fn with_scale(table: LandmarkTable, unit_scale: f64) -> Self {
        Self { table, unit_scale }
    }

    /// Default human ruler reporting centimeters.
    pub fn makehuman() -> Self {
        Self::new(LandmarkTable::makehuman(), Unit::Centimeters)
    }

    pub fn table(&self) -> &LandmarkTable {
        &self.table
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    /// Measure `name` on the model as it is now. Never mutates the model.
    pub fn measure<M: ShapeModel + ?Sized>(
        &self,
        model: &M,
        name: &str,
    ) -> Result<f64, MeasureError> {
        let landmarks = self
            .table
            .get(name)
            .ok_or_else(|| MeasureError::UnknownMeasurement {
                name: name.to_string(),
            })?;
        let raw = match landmarks {
            Landmarks::Chain(chain) => chain_length(model, chain)?,
            Landmarks::Extent { axis } => extent(model, *axis)?,
        };
        Ok(self.unit_scale * raw)
    }

    /// Apply one parameter value, then measure. The only path by which the
    /// solver observes the effect of a mutation.
    pub fn apply_and_measure<M: ShapeModel + ?Sized>(
        &self,
        model: &mut M,
        parameter: &str,
        value: f64,
        measurement: &str,
    ) -> Result<MeasurementSnapshot, MeasureError> {
        let value = model.apply_value(parameter, value)?;
        let measured = self.measure(model, measurement)?;
        Ok(MeasurementSnapshot {
            parameter: parameter.to_string(),
            value,
            measurement: measurement.to_string(),
            measured,
        })
    }
}

fn position<M: ShapeModel + ?Sized>(model: &M, index: usize) -> Result<Vector3<f64>, MeasureError> {
    Ok(Vector3::from(model.vertex_position(index)?))
}

fn chain_length<M: ShapeModel + ?Sized>(model: &M, chain: &[usize]) -> Result<f64, MeasureError> {
    let points = chain
        .iter()
        .map(|&i| position(model, i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(points.windows(2).map(|w| (w[1] - w[0]).norm()).sum())
}

fn extent<M: ShapeModel + ?Sized>(model: &M, axis: Axis) -> Result<f64, MeasureError> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for i in 0..model.vertex_count() {
        let c = model.vertex_position(i)?[axis.index()];
        lo = lo.min(c);
        hi = hi.max(c);
    }
    Ok(if hi >= lo { hi - lo } else { 0.0 })
}
