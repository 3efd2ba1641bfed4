//! Single-parameter bisection against a target measurement.
//!
//! Precondition: the evaluated function is monotonic non-decreasing in the
//! parameter over the searched bounds. It is not verified. On a decreasing
//! or non-monotonic parameter the search walks away from the root and
//! returns the best probe it happened to see.

use tracing::debug;

/// Stopping rules for one bisection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionConfig {
    /// Early exit once `|measured - target| < tolerance`.
    pub tolerance: f64,
    /// Maximum evaluations, including the final restore of the best value.
    /// Above 1, one evaluation is always held back for that restore, so at
    /// most `max_iterations - 1` bisection steps run even when no restore
    /// turns out to be needed.
    pub max_iterations: usize,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            max_iterations: 20,
        }
    }
}

/// Interval and best-so-far for one bisection call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    pub low: f64,
    pub high: f64,
    pub best_value: f64,
    pub best_error: f64,
}

impl SearchState {
    pub fn new((low, high): (f64, f64)) -> Self {
        Self {
            low,
            high,
            best_value: 0.5 * (low + high),
            best_error: f64::INFINITY,
        }
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    /// Record a probe. Ties keep the earlier value.
    fn record(&mut self, value: f64, error: f64) {
        if error < self.best_error {
            self.best_error = error;
            self.best_value = value;
        }
    }

    /// Move the bracket toward the target.
    fn narrow(&mut self, value: f64, measured: f64, target: f64) {
        if measured < target {
            self.low = value;
        } else {
            self.high = value;
        }
    }
}

/// One probe of the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRecord {
    pub value: f64,
    pub measured: f64,
    pub error: f64,
    /// Best error after this probe.
    pub best_error: f64,
}

/// Outcome of a bisection.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSolution {
    /// The value the evaluated system was left at.
    pub value: f64,
    pub error: f64,
    /// Number of calls to the evaluation function.
    pub evaluations: usize,
    /// Whether the tolerance was met.
    pub converged: bool,
    /// Whether the best value had to be re-applied after the last probe.
    pub restored: bool,
    pub history: Vec<ProbeRecord>,
}

/// Bisect `bounds` for the value whose evaluation is closest to `target`.
///
/// `eval` applies a value and returns the resulting measurement. Its side
/// effect is intended: after this returns, the last call made was with the
/// returned `value`. If the loop ends without meeting the tolerance and the
/// last probe was not the best one, the best value is evaluated once more.
/// Whether that restore is needed is only known after the last probe, so
/// one evaluation is always reserved for it: a cap of 20 bisects at most 19
/// times, and the total never exceeds `max_iterations`.
pub fn bisect<E, F>(
    mut eval: F,
    target: f64,
    bounds: (f64, f64),
    config: &BisectionConfig,
) -> Result<RootSolution, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    debug_assert!(bounds.0 <= bounds.1, "bisection bounds out of order");
    let mut state = SearchState::new(bounds);
    let mut history = Vec::new();

    if config.max_iterations == 0 {
        return Ok(RootSolution {
            value: state.best_value,
            error: state.best_error,
            evaluations: 0,
            converged: false,
            restored: false,
            history,
        });
    }

    let probe_limit = config.max_iterations.saturating_sub(1).max(1);
    let mut last = state.best_value;

    for iteration in 0..probe_limit {
        let mid = state.midpoint();
        let measured = eval(mid)?;
        let error = (measured - target).abs();
        state.record(mid, error);
        history.push(ProbeRecord {
            value: mid,
            measured,
            error,
            best_error: state.best_error,
        });
        debug!(iteration, value = mid, measured, target, error, "bisection probe");

        if error < config.tolerance {
            return Ok(RootSolution {
                value: mid,
                error,
                evaluations: history.len(),
                converged: true,
                restored: false,
                history,
            });
        }

        state.narrow(mid, measured, target);
        last = mid;
    }

    let mut evaluations = history.len();
    let restored = last != state.best_value;
    if restored {
        eval(state.best_value)?;
        evaluations += 1;
    }
    debug!(
        value = state.best_value,
        error = state.best_error,
        evaluations,
        restored,
        "bisection exhausted"
    );

    Ok(RootSolution {
        value: state.best_value,
        error: state.best_error,
        evaluations,
        converged: false,
        restored,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn config(tolerance: f64, max_iterations: usize) -> BisectionConfig {
        BisectionConfig {
            tolerance,
            max_iterations,
        }
    }

    #[test]
    fn test_linear_root_within_tolerance() {
        let f = |v: f64| Ok::<_, Infallible>(3.0 * v + 1.0);
        let sol = bisect(f, 2.2, (0.0, 1.0), &config(1e-6, 40)).unwrap();
        assert!(sol.converged);
        assert!((3.0 * sol.value + 1.0 - 2.2).abs() < 1e-6);
        assert!(sol.evaluations <= 40);
    }

    #[test]
    fn test_early_exit_on_first_probe() {
        let mut calls = Vec::new();
        let sol = bisect(
            |v: f64| {
                calls.push(v);
                Ok::<_, Infallible>(if v == 0.5 { 20.0 } else { 0.0 })
            },
            20.0,
            (0.0, 1.0),
            &config(0.5, 20),
        )
        .unwrap();
        assert_eq!(calls, vec![0.5]);
        assert_eq!(sol.evaluations, 1);
        assert!(sol.converged);
        assert_eq!(sol.value, 0.5);
        assert_eq!(sol.error, 0.0);
    }

    #[test]
    fn test_restores_best_when_last_probe_was_worse() {
        let mut calls = Vec::new();
        let sol = bisect(
            |v: f64| {
                calls.push(v);
                Ok::<_, Infallible>(v)
            },
            0.3,
            (0.0, 1.0),
            &config(1e-12, 4),
        )
        .unwrap();
        // 0.5 -> 0.25 (best) -> 0.375, then restore 0.25
        assert_eq!(calls, vec![0.5, 0.25, 0.375, 0.25]);
        assert!(sol.restored);
        assert!(!sol.converged);
        assert_eq!(sol.value, 0.25);
        assert!((sol.error - 0.05).abs() < 1e-12);
        assert_eq!(sol.evaluations, 4);
    }

    #[test]
    fn test_unreachable_target_stays_within_budget() {
        let mut calls = 0;
        let sol = bisect(
            |v: f64| {
                calls += 1;
                Ok::<_, Infallible>(v)
            },
            5.0,
            (0.0, 1.0),
            &config(0.1, 10),
        )
        .unwrap();
        assert!(!sol.converged);
        assert!(!sol.restored);
        assert!(calls <= 10);
        assert_eq!(calls, sol.evaluations);
        assert!(sol.value > 0.99);
    }

    #[test]
    fn test_best_error_never_increases() {
        let sol = bisect(
            |v: f64| Ok::<_, Infallible>((v * 7.0).sin() + v),
            0.9,
            (0.0, 1.0),
            &config(1e-9, 30),
        )
        .unwrap();
        for pair in sol.history.windows(2) {
            assert!(pair[1].best_error <= pair[0].best_error);
        }
    }

    #[test]
    fn test_tie_keeps_earlier_value() {
        // Flat function: every probe has the same error.
        let sol = bisect(
            |_v: f64| Ok::<_, Infallible>(1.0),
            2.0,
            (0.0, 1.0),
            &config(0.5, 5),
        )
        .unwrap();
        assert_eq!(sol.value, 0.5);
        assert!(sol.restored);
    }

    #[test]
    fn test_one_evaluation_reserved_for_restore() {
        // Increasing probes on an unreachable target: the last probe is
        // always the best, yet only 19 of 20 evaluations are used.
        let sol = bisect(|v: f64| Ok::<_, Infallible>(v), 5.0, (0.0, 1.0), &config(0.1, 20)).unwrap();
        assert_eq!(sol.history.len(), 19);
        assert_eq!(sol.evaluations, 19);
        assert!(!sol.restored);
    }

    #[test]
    fn test_single_iteration_budget() {
        let mut calls = 0;
        let sol = bisect(
            |v: f64| {
                calls += 1;
                Ok::<_, Infallible>(v)
            },
            0.9,
            (0.0, 1.0),
            &config(0.01, 1),
        )
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(sol.value, 0.5);
        assert!(!sol.restored);
    }

    #[test]
    fn test_zero_budget_does_not_evaluate() {
        let sol = bisect(
            |_v: f64| -> Result<f64, Infallible> { panic!("must not be called") },
            1.0,
            (0.0, 1.0),
            &config(0.1, 0),
        )
        .unwrap();
        assert_eq!(sol.evaluations, 0);
        assert!(!sol.converged);
    }

    #[test]
    fn test_eval_error_propagates() {
        let result = bisect(|_v: f64| Err::<f64, _>("gone"), 1.0, (0.0, 1.0), &config(0.1, 5));
        assert_eq!(result.unwrap_err(), "gone");
    }

    #[test]
    fn test_decreasing_function_walks_away_from_root() {
        // 1 - v reaches 0.25 at v = 0.75, but the search assumes an
        // increasing function and moves toward 0.
        let sol = bisect(
            |v: f64| Ok::<_, Infallible>(1.0 - v),
            0.25,
            (0.0, 1.0),
            &config(0.01, 12),
        )
        .unwrap();
        assert!(!sol.converged);
        assert_eq!(sol.value, 0.5);
        assert!((sol.error - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_search_state_invariant_on_strictly_increasing() {
        let mut state = SearchState::new((0.0, 1.0));
        let target = 0.61;
        for _ in 0..25 {
            let mid = state.midpoint();
            let measured = mid * mid;
            state.record(mid, (measured - target).abs());
            state.narrow(mid, measured, target);
            assert!(state.low <= state.best_value && state.best_value <= state.high);
        }
    }
}
