//! Levenberg-Marquardt nonlinear least-squares solver.
//!
//! [`LevenbergMarquardtSolver`] is an alternative local strategy for
//! objectives that expose their residual vector through
//! [`Objective::residuals`]. It can be driven directly with a residual closure
//! via [`LevenbergMarquardtSolver::solve`] or through the [`Minimizer`]
//! capability.
//!
//! # Algorithm
//!
//! The Levenberg-Marquardt algorithm combines Gauss-Newton and gradient descent:
//!
//! ```text
//! (J^T J + λI) δ = J^T r
//! p_{n+1} = p_n + δ
//! ```
//!
//! where:
//! - `J` is the Jacobian matrix of residuals
//! - `r` is the residual vector
//! - `λ` is the damping factor (adjusted during iteration)
//! - `δ` is the parameter update step
//!
//! # Example
//!
//! ```
//! use pricer_core::math::solvers::{LevenbergMarquardtSolver, LMConfig};
//!
//! // Fit y = a * exp(-b * x) to data
//! let x_data = vec![0.0, 1.0, 2.0, 3.0, 4.0];
//! let y_data = vec![1.0, 0.37, 0.14, 0.05, 0.02];
//!
//! let config = LMConfig::default();
//! let solver = LevenbergMarquardtSolver::new(config);
//!
//! // Residual function: model(x) - y
//! let residuals = |params: &[f64]| -> Vec<f64> {
//!     let a = params[0];
//!     let b = params[1];
//!     x_data.iter().zip(&y_data).map(|(&x, &y)| {
//!         a * (-b * x).exp() - y
//!     }).collect()
//! };
//!
//! let initial_params = vec![1.0, 1.0];
//! let result = solver.solve(residuals, initial_params).unwrap();
//!
//! // Should converge to a ≈ 1.0, b ≈ 1.0
//! assert!(result.converged);
//! ```

use std::cell::Cell;

use super::finite_difference::{jacobian, FiniteDifferenceScheme};
use super::{MinimizationProblem, Minimizer, Objective, Solution};
use crate::types::SolverError;

/// Relative Jacobian step.
const JACOBIAN_STEP: f64 = 1e-7;

/// Configuration for Levenberg-Marquardt solver.
///
/// # Fields
///
/// * `tolerance` - Convergence tolerance for residual norm
/// * `max_iterations` - Maximum number of iterations
/// * `initial_lambda` - Initial damping factor
/// * `lambda_up` - Factor to increase lambda when step is rejected
/// * `lambda_down` - Factor to decrease lambda when step is accepted
/// * `min_lambda` - Minimum value for lambda
/// * `max_lambda` - Maximum value for lambda
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LMConfig {
    /// Convergence tolerance for relative residual change.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Factor to increase lambda on rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on accepted step.
    pub lambda_down: f64,
    /// Minimum damping factor.
    pub min_lambda: f64,
    /// Maximum damping factor.
    pub max_lambda: f64,
    /// Tolerance for parameter change convergence.
    pub param_tolerance: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-10,
            max_lambda: 1e10,
            param_tolerance: 1e-10,
        }
    }
}

impl LMConfig {
    /// Create a new LM configuration.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Default::default()
        }
    }

    /// Create a fast configuration with relaxed tolerances.
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), SolverError> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SolverError::InvalidConfiguration(format!(
                "LM tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !(self.initial_lambda > 0.0 && self.lambda_up > 1.0 && self.lambda_down < 1.0) {
            return Err(SolverError::InvalidConfiguration(
                "LM damping requires initial_lambda > 0, lambda_up > 1, lambda_down < 1"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Create a high precision configuration.
    pub fn high_precision() -> Self {
        Self {
            tolerance: 1e-14,
            max_iterations: 500,
            param_tolerance: 1e-14,
            ..Default::default()
        }
    }
}

/// Result of Levenberg-Marquardt optimization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LMResult {
    /// Final optimized parameters.
    pub params: Vec<f64>,
    /// Final residual sum of squares.
    pub residual_ss: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether convergence was achieved.
    pub converged: bool,
    /// Final lambda value.
    pub final_lambda: f64,
}

impl LMResult {
    /// Create a new LM result.
    pub fn new(
        params: Vec<f64>,
        residual_ss: f64,
        iterations: usize,
        converged: bool,
        final_lambda: f64,
    ) -> Self {
        Self {
            params,
            residual_ss,
            iterations,
            converged,
            final_lambda,
        }
    }

    /// Get the root mean square error.
    pub fn rmse(&self, n_observations: usize) -> f64 {
        if n_observations == 0 {
            return 0.0;
        }
        (self.residual_ss / n_observations as f64).sqrt()
    }
}

/// Levenberg-Marquardt nonlinear least-squares solver.
///
/// Solves problems of the form:
/// ```text
/// min_p ||r(p)||^2
/// ```
///
/// with a central-difference Jacobian of the residuals.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::LevenbergMarquardtSolver;
///
/// let solver = LevenbergMarquardtSolver::with_defaults();
/// let residuals = |p: &[f64]| vec![p[0] - 2.0, p[1] - 3.0];
///
/// let result = solver.solve(residuals, vec![0.0, 0.0]).unwrap();
/// assert!(result.converged);
/// assert!((result.params[0] - 2.0).abs() < 1e-6);
/// assert!((result.params[1] - 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
}

impl Default for LevenbergMarquardtSolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LevenbergMarquardtSolver {
    /// Create a new LM solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: LMConfig::default(),
        }
    }

    /// Get the solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Solve the nonlinear least-squares problem.
    ///
    /// # Arguments
    ///
    /// * `residuals` - Function that computes residuals given parameters
    /// * `initial_params` - Initial parameter guess
    ///
    /// # Returns
    ///
    /// * `Ok(LMResult)` - Optimization result with final parameters
    /// * `Err(SolverError)` - If optimization fails
    pub fn solve<F>(&self, residuals: F, initial_params: Vec<f64>) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        iterate(&self.config, &residuals, initial_params, &|_| {}, &|_| Ok(()))
    }
}

impl Minimizer for LevenbergMarquardtSolver {
    type Settings = LMConfig;

    fn name(&self) -> &'static str {
        "levenberg-marquardt"
    }

    /// Requires an objective exposing [`Objective::residuals`]. If the
    /// problem carries bounds, the start and every trial point are clamped
    /// into them.
    fn minimize(
        &self,
        problem: &MinimizationProblem<'_>,
        settings: &LMConfig,
        initial_guess: &[f64],
    ) -> Result<Solution, SolverError> {
        problem.validate_dimension(initial_guess.len())?;
        problem.check_cancelled(0)?;

        let objective: &dyn Objective = problem.objective();
        let n_residuals = objective
            .residuals(initial_guess)
            .map(|r| r.len())
            .ok_or_else(|| {
                SolverError::InvalidConfiguration(
                    "Levenberg-Marquardt requires an objective with residuals".to_string(),
                )
            })?;

        let evaluations = Cell::new(1usize);
        let residuals = |p: &[f64]| {
            evaluations.set(evaluations.get() + 1);
            objective
                .residuals(p)
                .filter(|r| r.len() == n_residuals)
                .unwrap_or_else(|| vec![f64::INFINITY; n_residuals])
        };
        let cancel = |iterations: usize| problem.check_cancelled(iterations);

        let project = |p: &mut [f64]| problem.project(p);

        let result = iterate(
            settings,
            &residuals,
            initial_guess.to_vec(),
            &project,
            &cancel,
        )?;
        Ok(Solution {
            params: result.params,
            value: result.residual_ss,
            iterations: result.iterations,
            evaluations: evaluations.get(),
            converged: result.converged,
        })
    }
}

/// Damped Gauss-Newton loop shared by [`LevenbergMarquardtSolver::solve`]
/// and the [`Minimizer`] implementation.
fn iterate(
    config: &LMConfig,
    residuals: &dyn Fn(&[f64]) -> Vec<f64>,
    initial_params: Vec<f64>,
    project: &dyn Fn(&mut [f64]),
    check_cancelled: &dyn Fn(usize) -> Result<(), SolverError>,
) -> Result<LMResult, SolverError> {
    config.validate()?;
    let n_params = initial_params.len();
    if n_params == 0 {
        return Err(SolverError::InvalidConfiguration(
            "empty parameter vector".to_string(),
        ));
    }

    let mut params = initial_params;
    project(&mut params);
    let mut lambda = config.initial_lambda;

    let mut r = residuals(&params);
    if r.is_empty() {
        return Err(SolverError::InvalidConfiguration(
            "empty residual vector".to_string(),
        ));
    }

    let mut ss = sum_of_squares(&r);
    if !ss.is_finite() {
        return Err(SolverError::NumericalInstability(format!(
            "non-finite residuals at initial parameters {:?}",
            params
        )));
    }

    for iteration in 0..config.max_iterations {
        check_cancelled(iteration)?;

        if ss.sqrt() < config.tolerance {
            return Ok(LMResult::new(params, ss, iteration, true, lambda));
        }

        let jac = jacobian(
            residuals,
            &params,
            &r,
            JACOBIAN_STEP,
            FiniteDifferenceScheme::Central,
        );

        let delta = match solve_normal_equations(&jac, &r, lambda, n_params) {
            Some(d) => d,
            None => {
                lambda = (lambda * config.lambda_up).min(config.max_lambda);
                continue;
            }
        };

        let param_change = delta.iter().map(|d| d * d).sum::<f64>().sqrt();
        let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt().max(1.0);
        if param_change / param_norm < config.param_tolerance {
            return Ok(LMResult::new(params, ss, iteration, true, lambda));
        }

        let mut trial: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
        project(&mut trial);
        let trial_r = residuals(&trial);
        let trial_ss = sum_of_squares(&trial_r);

        if trial_ss < ss {
            params = trial;
            r = trial_r;
            ss = trial_ss;
            lambda = (lambda * config.lambda_down).max(config.min_lambda);
        } else {
            lambda = (lambda * config.lambda_up).min(config.max_lambda);
        }
    }

    Ok(LMResult::new(
        params,
        ss,
        config.max_iterations,
        false,
        lambda,
    ))
}

/// Solve the normal equations `(J^T J + λI) δ = -J^T r`.
fn solve_normal_equations(
    jacobian: &[Vec<f64>],
    residuals: &[f64],
    lambda: f64,
    n_params: usize,
) -> Option<Vec<f64>> {
    let mut jtj = vec![vec![0.0; n_params]; n_params];
    for (i, row) in jtj.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            *entry = jacobian.iter().map(|jr| jr[i] * jr[j]).sum();
        }
        row[i] += lambda;
    }

    let jtr: Vec<f64> = (0..n_params)
        .map(|i| {
            -jacobian
                .iter()
                .zip(residuals)
                .map(|(jr, r)| jr[i] * r)
                .sum::<f64>()
        })
        .collect();

    solve_cholesky(&jtj, &jtr)
}

/// Compute sum of squares of a vector.
#[inline]
fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// Solve Ax = b using Cholesky decomposition.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Cholesky decomposition: A = L L^T
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 {
                    return None; // Not positive definite
                }
                l[i][j] = sum.sqrt();
            } else {
                if l[j][j].abs() < 1e-30 {
                    return None;
                }
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Solve L y = b (forward substitution)
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        if l[i][i].abs() < 1e-30 {
            return None;
        }
        y[i] = sum / l[i][i];
    }

    // Solve L^T x = y (backward substitution)
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        if l[i][i].abs() < 1e-30 {
            return None;
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
