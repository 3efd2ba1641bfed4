//! Measurement-constrained shape solver.
//!
//! Drives a parametric body model toward a set of target measurements by
//! bisecting each shape parameter against its own measurement, sweeping the
//! parameters in priority order, and nudging a decoupling axis when the
//! primary measurement drifts.

pub mod budget;
pub mod config;
pub mod configure;
pub mod descent;
pub mod error;
pub mod measure;
pub mod report;
pub mod root_finder;

pub use budget::DeformationBudget;
pub use config::{DecouplingAxis, SolverConfig};
pub use configure::configure_body;
pub use descent::CoordinateDescentSolver;
pub use error::{MeasureError, SolverError};
pub use measure::{Axis, LandmarkTable, Landmarks, MeasurementProbe, MeasurementSnapshot};
pub use report::{EntryStatus, ReportEntry, SolverReport};
pub use root_finder::{BisectionConfig, ProbeRecord, RootSolution, SearchState, bisect};
