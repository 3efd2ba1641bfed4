//! Test harness for the body shape solver.
//!
//! Provides synthetic body models with known coupling, a fluent bench for
//! running solves against them, and assertions with diagnostic output.
//!
//! # Key Components
//!
//! - [`fixtures`]: humanoid blend-shape models and their landmark table
//! - [`BodyBench`]: model + solver pair with named-measurement access
//! - [`assertions`]: report and deformation-count checks
//! - [`helpers`]: error type

pub mod assertions;
pub mod bench;
pub mod fixtures;
pub mod helpers;

pub use bench::BodyBench;
pub use helpers::HarnessError;
