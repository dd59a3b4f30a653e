//! Minimisation capability shared by the global and local strategies.
//!
//! A strategy implements [`Minimizer`] and is driven through one contract:
//!
//! ```text
//! minimize(problem, settings, initial_guess) -> Result<Solution, SolverError>
//! ```
//!
//! The [`MinimizationProblem`] carries the objective, optional box bounds and
//! an optional [`CancellationToken`]. Each strategy declares its own settings
//! type, so a population-based search and a gradient-based refinement can
//! have differently shaped configurations behind the same call.

use super::CancellationToken;
use crate::types::SolverError;

/// Scalar objective to be minimised.
///
/// Objectives that are a sum of squared residuals may also expose the
/// residual vector, which least-squares strategies use directly.
///
/// Any `Fn(&[f64]) -> f64` closure is an objective.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::Objective;
///
/// let rosenbrock = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
/// assert_eq!(rosenbrock.value(&[1.0, 1.0]), 0.0);
/// assert!(rosenbrock.residuals(&[1.0, 1.0]).is_none());
/// ```
pub trait Objective {
    /// Objective value at `params`. Non-finite values are treated as
    /// infeasible points by every strategy.
    fn value(&self, params: &[f64]) -> f64;

    /// Residual vector whose squared norm equals [`Objective::value`], if the
    /// objective has that structure.
    fn residuals(&self, _params: &[f64]) -> Option<Vec<f64>> {
        None
    }
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64,
{
    fn value(&self, params: &[f64]) -> f64 {
        self(params)
    }
}

/// Box constraint on a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterBounds {
    /// Minimum allowed value.
    pub min: f64,
    /// Maximum allowed value.
    pub max: f64,
}

impl ParameterBounds {
    /// Create new bounds.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Create unbounded.
    pub fn unbounded() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// Both ends finite and `min <= max`.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Check if a value is within bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value to bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Width of the interval.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Objective plus the optional bounds and cancellation token a solve runs under.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{CancellationToken, MinimizationProblem, ParameterBounds};
///
/// let objective = |x: &[f64]| x[0] * x[0];
/// let token = CancellationToken::new();
/// let problem = MinimizationProblem::new(&objective)
///     .with_bounds(vec![ParameterBounds::new(-1.0, 1.0)])
///     .with_cancellation(&token);
///
/// assert_eq!(problem.value(&[0.5]), 0.25);
/// assert!(problem.check_cancelled(0).is_ok());
/// token.cancel();
/// assert!(problem.check_cancelled(0).is_err());
/// ```
pub struct MinimizationProblem<'a> {
    objective: &'a dyn Objective,
    bounds: Option<Vec<ParameterBounds>>,
    cancellation: Option<&'a CancellationToken>,
}

impl<'a> MinimizationProblem<'a> {
    /// Unbounded, non-cancellable problem over `objective`.
    pub fn new(objective: &'a dyn Objective) -> Self {
        Self {
            objective,
            bounds: None,
            cancellation: None,
        }
    }

    /// Attach one bound per parameter.
    pub fn with_bounds(mut self, bounds: Vec<ParameterBounds>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Attach a cancellation token consulted between iterations.
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The wrapped objective.
    pub fn objective(&self) -> &dyn Objective {
        self.objective
    }

    /// Parameter bounds, if any.
    pub fn bounds(&self) -> Option<&[ParameterBounds]> {
        self.bounds.as_deref()
    }

    /// Objective value with NaN mapped to `+∞`.
    pub fn value(&self, params: &[f64]) -> f64 {
        let v = self.objective.value(params);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    }

    /// Clamp `params` into the bounds in place. No-op when unbounded.
    pub fn project(&self, params: &mut [f64]) {
        if let Some(bounds) = &self.bounds {
            for (p, b) in params.iter_mut().zip(bounds) {
                *p = b.clamp(*p);
            }
        }
    }

    /// Return `Err(SolverError::Cancelled)` if cancellation was requested.
    ///
    /// `iterations` is the number of completed iterations to report.
    pub fn check_cancelled(&self, iterations: usize) -> Result<(), SolverError> {
        match self.cancellation {
            Some(token) if token.is_cancelled() => Err(SolverError::Cancelled { iterations }),
            _ => Ok(()),
        }
    }

    /// Validate that bounds, when present, match the parameter count.
    pub fn validate_dimension(&self, n_params: usize) -> Result<(), SolverError> {
        if n_params == 0 {
            return Err(SolverError::InvalidConfiguration(
                "empty parameter vector".to_string(),
            ));
        }
        match &self.bounds {
            Some(bounds) if bounds.len() != n_params => {
                Err(SolverError::InvalidConfiguration(format!(
                    "{} bounds supplied for {} parameters",
                    bounds.len(),
                    n_params
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Outcome of a successful minimisation call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Best parameters found.
    pub params: Vec<f64>,
    /// Objective value at `params`.
    pub value: f64,
    /// Iterations (generations, quasi-Newton steps) performed.
    pub iterations: usize,
    /// Objective evaluations performed.
    pub evaluations: usize,
    /// Whether the strategy's own stopping criterion was met.
    pub converged: bool,
}

/// A minimisation strategy.
///
/// Implementations must check [`MinimizationProblem::check_cancelled`] at
/// every iteration boundary and never mid-evaluation.
pub trait Minimizer {
    /// Strategy-specific settings.
    type Settings;

    /// Short strategy name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Minimise `problem` starting from `initial_guess`.
    fn minimize(
        &self,
        problem: &MinimizationProblem<'_>,
        settings: &Self::Settings,
        initial_guess: &[f64],
    ) -> Result<Solution, SolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Residual;

    impl Objective for Residual {
        fn value(&self, params: &[f64]) -> f64 {
            params.iter().map(|p| p * p).sum()
        }

        fn residuals(&self, params: &[f64]) -> Option<Vec<f64>> {
            Some(params.to_vec())
        }
    }

    #[test]
    fn test_closure_objective() {
        let f = |x: &[f64]| x[0] + x[1];
        assert_eq!(f.value(&[1.0, 2.0]), 3.0);
    }

    #[test]
    fn test_residual_objective() {
        assert_eq!(Residual.residuals(&[1.0, -2.0]), Some(vec![1.0, -2.0]));
        assert_eq!(Residual.value(&[1.0, -2.0]), 5.0);
    }

    #[test]
    fn test_nan_value_maps_to_infinity() {
        let f = |_: &[f64]| f64::NAN;
        let problem = MinimizationProblem::new(&f);
        assert_eq!(problem.value(&[0.0]), f64::INFINITY);
    }

    #[test]
    fn test_project_clamps_each_coordinate() {
        let f = |_: &[f64]| 0.0;
        let problem = MinimizationProblem::new(&f).with_bounds(vec![
            ParameterBounds::new(0.0, 1.0),
            ParameterBounds::new(-1.0, 0.0),
        ]);
        let mut x = [2.0, 2.0];
        problem.project(&mut x);
        assert_eq!(x, [1.0, 0.0]);
    }

    #[test]
    fn test_validate_dimension() {
        let f = |_: &[f64]| 0.0;
        let problem = MinimizationProblem::new(&f).with_bounds(vec![ParameterBounds::unbounded()]);
        assert!(problem.validate_dimension(1).is_ok());
        assert!(matches!(
            problem.validate_dimension(2),
            Err(SolverError::InvalidConfiguration(_))
        ));
        assert!(problem.validate_dimension(0).is_err());
    }

    #[test]
    fn test_bounds_helpers() {
        let b = ParameterBounds::new(1e-4, 1.0);
        assert!(b.is_finite());
        assert!(b.contains(0.5));
        assert!(!b.contains(2.0));
        assert_eq!(b.clamp(-3.0), 1e-4);
        assert!(!ParameterBounds::unbounded().is_finite());
    }

    #[test]
    fn test_uncancelled_problem() {
        let f = |_: &[f64]| 0.0;
        assert!(MinimizationProblem::new(&f).check_cancelled(10).is_ok());
    }
}
