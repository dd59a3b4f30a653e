//! Integration tests for module exports.
//!
//! Verify that the public curve, solver and error types are exported and
//! usable together via absolute paths.

use chrono::NaiveDate;

/// Test that curve types are accessible via absolute path.
#[test]
fn test_curves_module_exports() {
    use pricer_core::market_data::curves::{YieldCurve, ZeroCurve};
    use pricer_core::market_data::MarketDataError;

    let curve = ZeroCurve::new(&[1.0, 5.0], &[0.02, 0.03]).unwrap();
    let df = curve.discount_factor(1.0).unwrap();
    assert!((df - (-0.02_f64).exp()).abs() < 1e-12);

    let err = ZeroCurve::new(&[1.0], &[f64::NAN]).unwrap_err();
    assert!(matches!(err, MarketDataError::NonFiniteRate { .. }));
}

/// Test that dated pillars convert through chrono.
#[test]
fn test_dated_curve_exports() {
    use pricer_core::market_data::curves::ZeroCurve;

    let valuation = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let pillars = [(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 0.02_f64)];
    let curve = ZeroCurve::from_dated_pillars(valuation, &pillars).unwrap();
    assert!((curve.dates()[0] - 1.0).abs() < 1e-12);
}

/// Test that every minimisation strategy is reachable through the trait.
#[test]
fn test_minimizer_strategies_exports() {
    use pricer_core::math::solvers::{
        Bfgs, BfgsSettings, CancellationToken, DifferentialEvolution,
        DifferentialEvolutionSettings, LMConfig, LevenbergMarquardtSolver, MinimizationProblem,
        Minimizer, Objective, ParameterBounds,
    };

    struct Shifted;

    impl Objective for Shifted {
        fn value(&self, x: &[f64]) -> f64 {
            (x[0] - 1.0).powi(2) + (x[1] + 0.5).powi(2)
        }

        fn residuals(&self, x: &[f64]) -> Option<Vec<f64>> {
            Some(vec![x[0] - 1.0, x[1] + 0.5])
        }
    }

    let objective = Shifted;
    let token = CancellationToken::new();

    let bounded = MinimizationProblem::new(&objective)
        .with_bounds(vec![
            ParameterBounds::new(-2.0, 2.0),
            ParameterBounds::new(-2.0, 2.0),
        ])
        .with_cancellation(&token);
    let global = DifferentialEvolution
        .minimize(&bounded, &DifferentialEvolutionSettings::default(), &[0.0, 0.0])
        .unwrap();
    assert!(global.value.is_finite());

    let local = MinimizationProblem::new(&objective).with_cancellation(&token);
    let bfgs = Bfgs
        .minimize(&local, &BfgsSettings::default(), &global.params)
        .unwrap();
    assert!((bfgs.params[0] - 1.0).abs() < 1e-5);

    let lm = LevenbergMarquardtSolver::with_defaults()
        .minimize(&local, &LMConfig::default(), &global.params)
        .unwrap();
    assert!(lm.value < 1e-8);
}

/// Test that a cancelled token surfaces as a solver error.
#[test]
fn test_cancellation_exports() {
    use pricer_core::math::solvers::{
        Bfgs, BfgsSettings, CancellationToken, MinimizationProblem, Minimizer,
    };
    use pricer_core::types::SolverError;

    let objective = |x: &[f64]| x[0] * x[0];
    let token = CancellationToken::new();
    token.cancel();

    let problem = MinimizationProblem::new(&objective).with_cancellation(&token);
    let err = Bfgs
        .minimize(&problem, &BfgsSettings::default(), &[1.0])
        .unwrap_err();
    assert!(matches!(err, SolverError::Cancelled { .. }));
}

/// Test that error types are accessible and work correctly.
#[test]
fn test_error_types_exports() {
    use pricer_core::types::{PricingError, SolverError};

    let err: PricingError = SolverError::NoBracket { a: 0.0, b: 1.0 }.into();
    assert!(matches!(err, PricingError::NumericalInstability(_)));
}
