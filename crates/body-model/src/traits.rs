use crate::types::*;

/// A parametric body whose mesh is re-deformed whenever a parameter changes.
///
/// Implemented by `BlendShapeModel` and by adapters around external
/// deformation engines. `apply` is synchronous: when it returns, vertex
/// positions reflect the new parameter values.
pub trait ShapeModel {
    /// Snapshot of a named parameter.
    fn parameter(&self, name: &str) -> Result<ShapeParameter, ModelError>;

    /// Names of all parameters, in a stable order.
    fn parameter_names(&self) -> Vec<String>;

    /// Write a batch of values and re-deform once.
    ///
    /// Values are clamped to each parameter's range. If any name is
    /// unknown, nothing is written.
    fn apply(&mut self, assignments: &[ParameterAssignment]) -> Result<(), ModelError>;

    /// Current position of a mesh vertex.
    fn vertex_position(&self, index: usize) -> Result<[f64; 3], ModelError>;

    /// Number of vertices in the mesh.
    fn vertex_count(&self) -> usize;

    /// Write a single value and re-deform. Returns the clamped value
    /// actually applied.
    fn apply_value(&mut self, name: &str, value: f64) -> Result<f64, ModelError> {
        let clamped = self.parameter(name)?.clamp(value);
        self.apply(&[ParameterAssignment::new(name, clamped)])?;
        Ok(clamped)
    }

    /// Current values of the named parameters, skipping unknown names.
    fn snapshot(&self, names: &[&str]) -> Vec<ParameterAssignment> {
        names
            .iter()
            .filter_map(|n| self.parameter(n).ok())
            .map(|p| ParameterAssignment::new(p.name, p.value))
            .collect()
    }
}
