//! A model paired with a solver for scenario tests.
//!
//! Wraps a `BlendShapeModel` and a `CoordinateDescentSolver` so scenarios
//! can solve, configure, and inspect by measurement name.

use body_model::{BlendShapeModel, ShapeModel};
use body_solver::{CoordinateDescentSolver, MeasurementProbe, SolverConfig, SolverReport, configure_body};
use body_types::{BodyRequest, ConstraintSet};

use crate::fixtures;
use crate::helpers::HarnessError;

/// Model + solver pair.
pub struct BodyBench {
    model: BlendShapeModel,
    solver: CoordinateDescentSolver,
}

impl BodyBench {
    /// Wrap `model` with a default-configured solver over `probe`.
    pub fn new(model: BlendShapeModel, probe: MeasurementProbe) -> Result<Self, HarnessError> {
        let solver = CoordinateDescentSolver::new(probe, SolverConfig::default())?;
        Ok(Self { model, solver })
    }

    /// Wrap a model measured with the humanoid landmark table.
    pub fn on(model: BlendShapeModel) -> Result<Self, HarnessError> {
        Self::new(model, fixtures::humanoid_probe())
    }

    /// The full humanoid fixture.
    pub fn humanoid() -> Result<Self, HarnessError> {
        Self::on(fixtures::humanoid()?)
    }

    /// Replace the solver configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Result<Self, HarnessError> {
        self.solver = CoordinateDescentSolver::new(self.solver.probe().clone(), config)?;
        Ok(self)
    }

    pub fn solve(&mut self, constraints: &ConstraintSet) -> Result<SolverReport, HarnessError> {
        Ok(self.solver.solve(&mut self.model, constraints)?)
    }

    pub fn configure(&mut self, request: &BodyRequest) -> Result<SolverReport, HarnessError> {
        Ok(configure_body(
            &mut self.model,
            self.solver.probe(),
            request,
            self.solver.config(),
        )?)
    }

    pub fn measure(&self, measurement: &str) -> Result<f64, HarnessError> {
        Ok(self.solver.probe().measure(&self.model, measurement)?)
    }

    pub fn parameter_value(&self, name: &str) -> Result<f64, HarnessError> {
        Ok(self.model.parameter(name)?.value)
    }

    /// Set a parameter directly, outside of any solve.
    pub fn set(&mut self, name: &str, value: f64) -> Result<f64, HarnessError> {
        Ok(self.model.apply_value(name, value)?)
    }

    pub fn deformations(&self) -> u64 {
        self.model.deformation_count()
    }

    pub fn reset_deformations(&mut self) {
        self.model.reset_deformation_count();
    }

    pub fn model(&self) -> &BlendShapeModel {
        &self.model
    }

    pub fn solver(&self) -> &CoordinateDescentSolver {
        &self.solver
    }
}
