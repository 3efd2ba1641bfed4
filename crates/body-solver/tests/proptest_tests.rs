//! Property-based tests for the root finder, probe, and solver bounds.

use std::convert::Infallible;

use body_model::{BlendShapeModel, Modifier, ShapeModel};
use body_solver::{
    BisectionConfig, CoordinateDescentSolver, LandmarkTable, MeasurementProbe, SolverConfig, bisect,
};
use body_types::{Constraint, ConstraintSet, Unit};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Positive slope for an increasing linear function.
fn arb_slope() -> impl Strategy<Value = f64> {
    0.5f64..50.0
}

fn arb_offset() -> impl Strategy<Value = f64> {
    -100.0f64..100.0
}

/// Target measurements for a two-rod model, in centimeters.
fn arb_rod_target() -> impl Strategy<Value = f64> {
    0.0f64..80.0
}

/// Two independent rods sharing a base, plus a coupling modifier that
/// lengthens both.
fn two_rods() -> BlendShapeModel {
    BlendShapeModel::new(&[[0.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 3.0]])
        .with_modifier(Modifier::symmetric("a").translate(&[1], [0.0, 1.0, 0.0]))
        .unwrap()
        .with_modifier(
            Modifier::symmetric("b")
                .incr(vec![(3, [0.0, 0.0, 1.0]), (1, [0.0, 0.5, 0.0])])
                .decr(vec![(3, [0.0, 0.0, -1.0]), (1, [0.0, -0.5, 0.0])]),
        )
        .unwrap()
}

fn rod_probe() -> MeasurementProbe {
    let table = LandmarkTable::new()
        .with_chain("a", vec![0, 1])
        .with_chain("b", vec![2, 3]);
    MeasurementProbe::new(table, Unit::Centimeters)
}

// ---------------------------------------------------------------------------
// 1. Linear root within range is found to tolerance
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn bisection_finds_linear_root(
        a in arb_slope(),
        b in arb_offset(),
        t in 0.0f64..1.0,
    ) {
        let target = a * t + b;
        let config = BisectionConfig { tolerance: 1e-3, max_iterations: 40 };
        let sol = bisect(|v| Ok::<_, Infallible>(a * v + b), target, (0.0, 1.0), &config).unwrap();
        prop_assert!(sol.converged, "no convergence for a={} b={} t={}", a, b, t);
        prop_assert!((a * sol.value + b - target).abs() < 1e-3);
        prop_assert!(sol.evaluations <= 40);
    }
}

// ---------------------------------------------------------------------------
// 2. Out-of-range target returns the minimum-error probe
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn bisection_returns_min_error_probe(
        a in arb_slope(),
        b in arb_offset(),
        excess in 1.0f64..100.0,
        max_iterations in 1usize..30,
    ) {
        let target = a + b + excess;
        let config = BisectionConfig { tolerance: 1e-6, max_iterations };
        let sol = bisect(|v| Ok::<_, Infallible>(a * v + b), target, (0.0, 1.0), &config).unwrap();
        let min_error = sol.history.iter().map(|p| p.error).fold(f64::INFINITY, f64::min);
        prop_assert!(!sol.converged);
        prop_assert_eq!(sol.error, min_error);
        prop_assert!(sol.evaluations <= max_iterations);
    }
}

// ---------------------------------------------------------------------------
// 3. best_error is non-increasing across probes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn best_error_is_monotone(
        c in 0.1f64..10.0,
        target in -5.0f64..15.0,
    ) {
        let config = BisectionConfig { tolerance: 1e-9, max_iterations: 25 };
        let sol = bisect(|v| Ok::<_, Infallible>(c * v * v * v - 1.0), target, (-1.0, 2.0), &config).unwrap();
        for pair in sol.history.windows(2) {
            prop_assert!(pair[1].best_error <= pair[0].best_error);
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Probe scales linearly with the unit multiplier
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn probe_scales_linearly(
        z in 0.1f64..100.0,
        scale in 0.1f64..100.0,
    ) {
        let model = BlendShapeModel::new(&[[0.0, 0.0, 0.0], [0.0, 0.0, z]]);
        let table = LandmarkTable::new().with_chain("seg", vec![0, 1]);
        let measured = MeasurementProbe::with_scale(table, scale).measure(&model, "seg").unwrap();
        prop_assert!((measured - scale * z).abs() < 1e-9 * scale * z.max(1.0));
    }
}

// ---------------------------------------------------------------------------
// 5. Solver never exceeds its deformation cap
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn solver_respects_deformation_cap(
        target_a in arb_rod_target(),
        target_b in arb_rod_target(),
        outer in 1usize..6,
        inner in 1usize..12,
    ) {
        let config = SolverConfig {
            max_outer_iterations: outer,
            primary_inner_iterations: inner,
            secondary_inner_iterations: inner,
            ..SolverConfig::default()
        };
        let set = ConstraintSet::new()
            .push(Constraint::new("a", "a", target_a, 0.1))
            .push(Constraint::new("b", "b", target_b, 0.1));
        let cap = config.deformation_cap(set.as_slice());
        let solver = CoordinateDescentSolver::new(rod_probe(), config).unwrap();
        let mut model = two_rods();
        let report = solver.solve(&mut model, &set).unwrap();
        prop_assert!(model.deformation_count() as usize <= cap);
        prop_assert_eq!(report.deformations as u64, model.deformation_count());
    }
}

// ---------------------------------------------------------------------------
// 6. Returned report matches the model it leaves behind
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn report_describes_final_model(
        target_a in arb_rod_target(),
        target_b in arb_rod_target(),
    ) {
        let probe = rod_probe();
        let solver = CoordinateDescentSolver::new(probe.clone(), SolverConfig::fast()).unwrap();
        let mut model = two_rods();
        let set = ConstraintSet::new()
            .push(Constraint::new("a", "a", target_a, 0.1))
            .push(Constraint::new("b", "b", target_b, 0.1));
        let report = solver.solve(&mut model, &set).unwrap();
        for entry in &report.entries {
            let now = probe.measure(&model, &entry.measurement).unwrap();
            prop_assert!((entry.current().unwrap() - now).abs() < 1e-9);
        }
        prop_assert!(model.parameter("a").unwrap().value.abs() <= 1.0);
    }
}
