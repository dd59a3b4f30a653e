//! Finite-difference derivatives for objectives without an analytic gradient.

/// Finite-difference stencil.
///
/// Higher-order stencils cost more evaluations per coordinate but remove
/// truncation error that would otherwise limit how tightly a gradient-based
/// strategy can converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FiniteDifferenceScheme {
    /// `(f(x+h) - f(x)) / h`, one extra evaluation, O(h).
    Forward,
    /// `(f(x+h) - f(x-h)) / 2h`, two evaluations, O(h²).
    Central,
    /// `(-f(x+2h) + 8f(x+h) - 8f(x-h) + f(x-2h)) / 12h`, four evaluations, O(h⁴).
    #[default]
    FivePoint,
}

impl FiniteDifferenceScheme {
    /// Objective evaluations per coordinate.
    pub fn evaluations_per_coordinate(&self) -> usize {
        match self {
            FiniteDifferenceScheme::Forward => 1,
            FiniteDifferenceScheme::Central => 2,
            FiniteDifferenceScheme::FivePoint => 4,
        }
    }
}

/// Step for coordinate value `x`: `step * max(1, |x|)`.
#[inline]
fn scaled_step(step: f64, x: f64) -> f64 {
    step * x.abs().max(1.0)
}

/// Gradient of a scalar function by finite differences.
///
/// `f_x` is `f(x)`, reused by the forward scheme.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::finite_difference::{gradient, FiniteDifferenceScheme};
///
/// let f = |x: &[f64]| x[0] * x[0] + 3.0 * x[1];
/// let x = [2.0, 1.0];
/// let g = gradient(&f, &x, f(&x), 1e-5, FiniteDifferenceScheme::FivePoint);
/// assert!((g[0] - 4.0).abs() < 1e-8);
/// assert!((g[1] - 3.0).abs() < 1e-8);
/// ```
pub fn gradient<F>(f: &F, x: &[f64], f_x: f64, step: f64, scheme: FiniteDifferenceScheme) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64 + ?Sized,
{
    let mut point = x.to_vec();
    let mut grad = Vec::with_capacity(x.len());

    for i in 0..x.len() {
        let h = scaled_step(step, x[i]);
        let mut eval = |offset: f64| {
            point[i] = x[i] + offset;
            let v = f(&point);
            point[i] = x[i];
            v
        };

        let g = match scheme {
            FiniteDifferenceScheme::Forward => (eval(h) - f_x) / h,
            FiniteDifferenceScheme::Central => (eval(h) - eval(-h)) / (2.0 * h),
            FiniteDifferenceScheme::FivePoint => {
                (-eval(2.0 * h) + 8.0 * eval(h) - 8.0 * eval(-h) + eval(-2.0 * h)) / (12.0 * h)
            }
        };
        grad.push(g);
    }

    grad
}

/// Jacobian of a vector function by finite differences, as `J[row][param]`.
///
/// `r_x` is `r(x)` and fixes the number of rows. Evaluations returning a
/// different length are treated as missing and give a zero column entry.
pub fn jacobian<F>(
    r: &F,
    x: &[f64],
    r_x: &[f64],
    step: f64,
    scheme: FiniteDifferenceScheme,
) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64> + ?Sized,
{
    let n_rows = r_x.len();
    let mut jac = vec![vec![0.0; x.len()]; n_rows];
    let mut point = x.to_vec();

    for j in 0..x.len() {
        let h = scaled_step(step, x[j]);
        let mut eval = |offset: f64| {
            point[j] = x[j] + offset;
            let v = r(&point);
            point[j] = x[j];
            v
        };

        let column: Vec<f64> = match scheme {
            FiniteDifferenceScheme::Forward => {
                let up = eval(h);
                (0..n_rows)
                    .map(|k| up.get(k).map_or(0.0, |u| (u - r_x[k]) / h))
                    .collect()
            }
            FiniteDifferenceScheme::Central => {
                let (up, down) = (eval(h), eval(-h));
                (0..n_rows)
                    .map(|k| match (up.get(k), down.get(k)) {
                        (Some(u), Some(d)) => (u - d) / (2.0 * h),
                        _ => 0.0,
                    })
                    .collect()
            }
            FiniteDifferenceScheme::FivePoint => {
                let (up2, up, down, down2) = (eval(2.0 * h), eval(h), eval(-h), eval(-2.0 * h));
                (0..n_rows)
                    .map(|k| match (up2.get(k), up.get(k), down.get(k), down2.get(k)) {
                        (Some(a), Some(b), Some(c), Some(d)) => {
                            (-a + 8.0 * b - 8.0 * c + d) / (12.0 * h)
                        }
                        _ => 0.0,
                    })
                    .collect()
            }
        };

        for (row, value) in jac.iter_mut().zip(column) {
            row[j] = value;
        }
    }

    jac
}
