//! Yield curve trait definition.

use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Bump used by the default instantaneous forward, in years.
const FORWARD_BUMP: f64 = 1e-4;

/// Generic yield curve trait for discount factor and rate calculations.
///
/// # Contract
///
/// - `discount_factor(t)` returns the discount factor D(t) for maturity t
/// - `zero_rate(t)` returns the continuously compounded zero rate r(t)
/// - `forward_rate(t1, t2)` returns the forward rate between t1 and t2
/// - `instantaneous_forward(t)` returns f(0, t) = -d ln D(t) / dt
///
/// # Invariants
///
/// - D(0) = 1 (discount factor at time 0 is 1)
/// - D(t) > 0 for all t >= 0 (discount factors are positive)
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{YieldCurve, ZeroCurve};
///
/// let curve = ZeroCurve::flat(0.05_f64);
///
/// let df = curve.discount_factor(1.0).unwrap();
/// assert!((df - 0.951229).abs() < 1e-5);
///
/// let fwd = curve.forward_rate(1.0, 2.0).unwrap();
/// assert!((fwd - 0.05).abs() < 1e-10);
///
/// let inst = curve.instantaneous_forward(3.0).unwrap();
/// assert!((inst - 0.05).abs() < 1e-8);
/// ```
pub trait YieldCurve<T: Float> {
    /// Return the discount factor for maturity `t`.
    ///
    /// # Arguments
    ///
    /// * `t` - Time to maturity in years (must be >= 0)
    ///
    /// # Returns
    ///
    /// * `Ok(D(t))` - Discount factor at time t
    /// * `Err(MarketDataError::InvalidMaturity)` - If t < 0
    ///
    /// # Mathematical Definition
    ///
    /// For a continuously compounded rate r(t):
    /// ```text
    /// D(t) = exp(-r(t) * t)
    /// ```
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError>;

    /// Return the continuously compounded zero rate for maturity `t`.
    ///
    /// # Default Implementation
    ///
    /// ```text
    /// r(t) = -ln(D(t)) / t
    /// ```
    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        let df = self.discount_factor(t)?;
        if t <= T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok(-df.ln() / t)
    }

    /// Return the forward rate between t1 and t2.
    ///
    /// # Default Implementation
    ///
    /// ```text
    /// f(t1, t2) = -ln(D(t2) / D(t1)) / (t2 - t1)
    /// ```
    fn forward_rate(&self, t1: T, t2: T) -> Result<T, MarketDataError> {
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        let dt = t2 - t1;
        if dt <= T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: dt.to_f64().unwrap_or(0.0),
            });
        }
        Ok(-(df2 / df1).ln() / dt)
    }

    /// Return the instantaneous forward rate f(0, t).
    ///
    /// The default takes a central difference of `ln D` with a `1e-4`
    /// year bump, falling back to a forward difference at `t = 0`.
    fn instantaneous_forward(&self, t: T) -> Result<T, MarketDataError> {
        let h = T::from(FORWARD_BUMP).unwrap_or_else(T::epsilon);
        let lower = if t > h { t - h } else { T::zero() };
        let upper = t + h;
        self.forward_rate(lower, upper)
    }
}
