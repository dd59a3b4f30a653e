//! BFGS quasi-Newton minimiser with finite-difference gradients.
//!
//! # Algorithm
//!
//! ```text
//! d_k     = -H_k g_k
//! x_{k+1} = x_k + t_k d_k              (Armijo backtracking on t_k)
//! H_{k+1} = (I - ρ s yᵀ) H_k (I - ρ y sᵀ) + ρ s sᵀ,   ρ = 1 / (yᵀ s)
//! ```
//!
//! The gradient `g` is approximated by finite differences, by default with
//! the five-point stencil. After the first accepted step the identity start
//! is rescaled by `sᵀy / yᵀy`, which matters when parameters live on very
//! different scales.

use tracing::debug;

use super::finite_difference::{gradient, FiniteDifferenceScheme};
use super::{MinimizationProblem, Minimizer, Solution};
use crate::types::SolverError;

/// Armijo sufficient-decrease constant.
const ARMIJO_C1: f64 = 1e-4;

/// Maximum step halvings in one line search.
const MAX_BACKTRACKS: usize = 60;

/// Consecutive negligible decreases treated as a stall.
const STALL_ITERATIONS: usize = 3;

/// Settings for [`Bfgs`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BfgsSettings {
    /// Relative finite-difference step: `h_i = step_size * max(1, |x_i|)`.
    pub step_size: f64,
    /// Stop when `‖g‖∞ <= epsilon`, or when three consecutive accepted
    /// steps each change the objective by at most `epsilon * max(1, |f|)`.
    pub epsilon: f64,
    /// Maximum quasi-Newton iterations.
    pub max_iterations: usize,
    /// Finite-difference stencil.
    pub scheme: FiniteDifferenceScheme,
}

impl Default for BfgsSettings {
    fn default() -> Self {
        Self {
            step_size: 1e-7,
            epsilon: 1e-7,
            max_iterations: 1000,
            scheme: FiniteDifferenceScheme::FivePoint,
        }
    }
}

impl BfgsSettings {
    fn validate(&self) -> Result<(), SolverError> {
        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return Err(SolverError::InvalidConfiguration(format!(
                "finite-difference step must be positive, got {}",
                self.step_size
            )));
        }
        if !(self.epsilon >= 0.0) {
            return Err(SolverError::InvalidConfiguration(format!(
                "epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Unconstrained BFGS minimiser.
///
/// If the problem carries bounds, every trial point is clamped into them
/// before evaluation.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{Bfgs, BfgsSettings, MinimizationProblem, Minimizer};
///
/// let rosenbrock = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
/// let problem = MinimizationProblem::new(&rosenbrock);
///
/// let solution = Bfgs.minimize(&problem, &BfgsSettings::default(), &[-1.2, 1.0]).unwrap();
/// assert!((solution.params[0] - 1.0).abs() < 1e-4);
/// assert!((solution.params[1] - 1.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Bfgs;

impl Minimizer for Bfgs {
    type Settings = BfgsSettings;

    fn name(&self) -> &'static str {
        "BFGS"
    }

    fn minimize(
        &self,
        problem: &MinimizationProblem<'_>,
        settings: &Self::Settings,
        initial_guess: &[f64],
    ) -> Result<Solution, SolverError> {
        settings.validate()?;
        let n = initial_guess.len();
        problem.validate_dimension(n)?;

        let objective = |x: &[f64]| {
            let mut p = x.to_vec();
            problem.project(&mut p);
            problem.value(&p)
        };
        let per_gradient = n * settings.scheme.evaluations_per_coordinate();

        let mut x = initial_guess.to_vec();
        problem.project(&mut x);
        let mut f = objective(&x);
        let mut evaluations = 1;
        if !f.is_finite() {
            return Err(SolverError::NumericalInstability(format!(
                "objective is not finite at the starting point {:?}",
                x
            )));
        }

        let mut g = gradient(&objective, &x, f, settings.step_size, settings.scheme);
        evaluations += per_gradient;
        let mut h = identity(n);
        let mut fresh_hessian = true;
        let mut stalled = 0;

        for iteration in 0..settings.max_iterations {
            problem.check_cancelled(iteration)?;

            if g.iter().any(|v| !v.is_finite()) {
                return Err(SolverError::NumericalInstability(format!(
                    "non-finite gradient at iteration {}",
                    iteration
                )));
            }

            let g_norm = g.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            debug!(iteration, value = f, gradient_norm = g_norm, "BFGS iteration");
            if g_norm <= settings.epsilon {
                return Ok(solution(x, f, iteration, evaluations, true));
            }

            let mut direction = mat_vec(&h, &g);
            direction.iter_mut().for_each(|d| *d = -*d);
            let mut slope = dot(&g, &direction);
            if slope >= 0.0 {
                // Not a descent direction; fall back to steepest descent
                h = identity(n);
                fresh_hessian = true;
                direction = g.iter().map(|v| -v).collect();
                slope = dot(&g, &direction);
            }

            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let trial: Vec<f64> = x
                    .iter()
                    .zip(&direction)
                    .map(|(xi, di)| xi + step * di)
                    .collect();
                let f_trial = objective(&trial);
                evaluations += 1;
                if f_trial.is_finite() && f_trial <= f + ARMIJO_C1 * step * slope {
                    accepted = Some((trial, f_trial));
                    break;
                }
                step *= 0.5;
            }

            let Some((mut x_new, f_new)) = accepted else {
                if fresh_hessian {
                    debug!(iteration, "BFGS line search failed from steepest descent");
                    return Ok(solution(x, f, iteration, evaluations, false));
                }
                h = identity(n);
                fresh_hessian = true;
                continue;
            };
            problem.project(&mut x_new);

            let g_new = gradient(&objective, &x_new, f_new, settings.step_size, settings.scheme);
            evaluations += per_gradient;

            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();
            let decrease = f - f_new;

            x = x_new;
            f = f_new;
            g = g_new;

            if decrease.abs() <= settings.epsilon * f.abs().max(1.0) {
                stalled += 1;
                if stalled >= STALL_ITERATIONS {
                    return Ok(solution(x, f, iteration + 1, evaluations, true));
                }
            } else {
                stalled = 0;
            }

            let sy = dot(&s, &y);
            if sy > f64::EPSILON * dot(&s, &s).sqrt() * dot(&y, &y).sqrt() {
                if fresh_hessian {
                    let scale = sy / dot(&y, &y);
                    h.iter_mut().flatten().for_each(|v| *v *= scale);
                }
                update_inverse_hessian(&mut h, &s, &y, sy);
                fresh_hessian = false;
            }
        }

        Ok(solution(x, f, settings.max_iterations, evaluations, false))
    }
}

fn solution(
    params: Vec<f64>,
    value: f64,
    iterations: usize,
    evaluations: usize,
    converged: bool,
) -> Solution {
    Solution {
        params,
        value,
        iterations,
        evaluations,
        converged,
    }
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

/// `H ← (I - ρ s yᵀ) H (I - ρ y sᵀ) + ρ s sᵀ`, expanded to avoid forming
/// the outer products.
fn update_inverse_hessian(h: &mut [Vec<f64>], s: &[f64], y: &[f64], sy: f64) {
    let rho = 1.0 / sy;
    let hy = mat_vec(h, y);
    let yhy = dot(y, &hy);
    let n = s.len();
    for i in 0..n {
        for j in 0..n {
            h[i][j] += (1.0 + rho * yhy) * rho * s[i] * s[j] - rho * (hy[i] * s[j] + s[i] * hy[j]);
        }
    }
}
