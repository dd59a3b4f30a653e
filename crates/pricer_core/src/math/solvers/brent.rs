//! Brent's method root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Brent's method root finder.
///
/// Combines bisection, secant, and inverse quadratic interpolation for
/// robust root finding without requiring derivatives. Guaranteed to
/// converge for continuous functions with a valid bracket.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
///
/// // Solve x³ - x - 2 = 0 in bracket [1, 2]
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!((f(root)).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Create a new Brent solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Find a root of `f` in the bracket [a, b].
    ///
    /// Requires that `f(a)` and `f(b)` have opposite signs (a valid bracket).
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root where `|f(x)| < tolerance`
    /// * `Err(SolverError::NoBracket)` - `f(a)` and `f(b)` have same sign
    /// * `Err(SolverError::MaxIterationsExceeded)` - Failed to converge
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let mut a = a;
        let mut b = b;
        let mut fa = f(a);
        let mut fb = f(b);

        if fa * fb > T::zero() {
            return Err(SolverError::NoBracket {
                a: a.to_f64().unwrap_or(f64::NAN),
                b: b.to_f64().unwrap_or(f64::NAN),
            });
        }

        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }

        let mut c = a;
        let mut fc = fa;
        let mut d = b - a;
        let mut e = d;

        let two = T::one() + T::one();
        let three = two + T::one();
        let tol = self.config.tolerance;

        for _ in 0..self.config.max_iterations {
            if fb.abs() < tol {
                return Ok(b);
            }

            let m = (c - b) / two;
            if m.abs() <= tol {
                return Ok(b);
            }

            let interpolated = if fa != fc && fb != fc {
                // Inverse quadratic interpolation
                let r = fb / fc;
                let s = fb / fa;
                let t = fa / fc;
                let p = s * (t * (r - t) * (c - b) - (T::one() - r) * (b - a));
                let q = (t - T::one()) * (r - T::one()) * (s - T::one());
                Some((p, q))
            } else if fb != fa {
                // Secant step
                let s = fb / fa;
                Some((two * m * s, T::one() - s))
            } else {
                None
            };

            match interpolated {
                Some((p, q))
                    if p.abs() < (three * m * q).abs() / two && p.abs() < (e * q).abs() / two =>
                {
                    e = d;
                    d = p / q;
                }
                _ => {
                    d = m;
                    e = m;
                }
            }

            a = b;
            fa = fb;

            b = if d.abs() > tol {
                b + d
            } else if m > T::zero() {
                b + tol
            } else {
                b - tol
            };
            fb = f(b);

            // Keep f(b) and f(c) on opposite sides of zero
            if (fb > T::zero() && fc > T::zero()) || (fb < T::zero() && fc < T::zero()) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }

            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Find a root of `f` starting from `[center - half_width, center + half_width]`,
    /// doubling the half-width until the endpoints bracket a sign change.
    ///
    /// Used when only a plausible neighbourhood of the root is known, as for
    /// the critical short rate in a coupon-bond decomposition.
    ///
    /// # Returns
    ///
    /// * `Err(SolverError::NoBracket)` - No sign change found within
    ///   `max_bracket_expansions` widenings
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::solvers::BrentSolver;
    ///
    /// let solver: BrentSolver<f64> = BrentSolver::with_defaults();
    /// let root = solver.find_root_expanding(|x| (-x).exp() - 0.2, 0.0, 0.5).unwrap();
    /// assert!((root - 5.0_f64.ln()).abs() < 1e-10);
    /// ```
    pub fn find_root_expanding<F>(&self, f: F, center: T, half_width: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        if half_width.is_nan() || half_width <= T::zero() {
            return Err(SolverError::InvalidConfiguration(
                "bracket half-width must be positive".to_string(),
            ));
        }

        let two = T::one() + T::one();
        let mut width = half_width;
        for _ in 0..=self.config.max_bracket_expansions {
            let (lo, hi) = (center - width, center + width);
            let (f_lo, f_hi) = (f(lo), f(hi));
            if f_lo.is_finite() && f_hi.is_finite() && f_lo * f_hi <= T::zero() {
                return self.find_root(&f, lo, hi);
            }
            width = width * two;
        }

        Err(SolverError::NoBracket {
            a: (center - width).to_f64().unwrap_or(f64::NAN),
            b: (center + width).to_f64().unwrap_or(f64::NAN),
        })
    }
}
