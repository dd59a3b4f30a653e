//! Hull-White one-factor interest rate model.
//!
//! The Hull-White model is a short-rate model described by:
//! ```text
//! dr(t) = [theta(t) - a * r(t)] * dt + sigma * dW(t)
//! ```
//! where:
//! - a = mean reversion speed
//! - sigma = volatility
//! - theta(t) = time-dependent drift fitted to the initial zero curve
//!
//! ## Closed Forms
//!
//! With `φ(x) = (1 - e^{-x}) / x`:
//!
//! ```text
//! B(τ)   = τ φ(aτ)                       bond sensitivity to r
//! V(T)   = T φ(2aT)                      short-rate variance / σ²
//! σ_p    = |σ| √V(T) B(S - T)            zero-bond option volatility
//! P(T,S) = A(T,S) e^{-B(S-T) r(T)}
//! A(T,S) = P(0,S)/P(0,T) · exp(B f(0,T) - σ²/2 · V(T) · B²)
//! ```
//!
//! `φ` switches to its Taylor series near zero, so every formula is
//! continuous through `a = 0`, where the model becomes Ho-Lee.
//!
//! European swaptions are priced with Jamshidian's decomposition into a
//! portfolio of zero-bond options struck at the bond prices implied by the
//! critical short rate.

use pricer_core::math::solvers::{BrentSolver, SolverConfig};

use crate::analytical::distributions::norm_cdf;
use crate::analytical::AnalyticalError;
use crate::instruments::rates::{DiscountedSwaption, SwaptionType};

/// Below this `|x|`, `φ(x)` uses its Taylor expansion.
const PHI_SERIES_THRESHOLD: f64 = 1e-6;

/// Bond option volatility below which the option is worth its intrinsic value.
const MIN_BOND_VOLATILITY: f64 = 1e-14;

/// Initial half-width of the critical-rate bracket.
const CRITICAL_RATE_HALF_WIDTH: f64 = 0.5;

/// Tolerance on the critical short rate.
const CRITICAL_RATE_TOLERANCE: f64 = 1e-14;

/// `(1 - e^{-x}) / x`, continuous at zero.
#[inline]
fn phi(x: f64) -> f64 {
    if x.abs() < PHI_SERIES_THRESHOLD {
        1.0 - x / 2.0 + x * x / 6.0
    } else {
        -(-x).exp_m1() / x
    }
}

/// Zero-bond option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOptionType {
    /// Right to buy the bond.
    Call,
    /// Right to sell the bond.
    Put,
}

/// Hull-White model parameters.
///
/// # Fields
///
/// * `mean_reversion` - Mean reversion speed (a)
/// * `volatility` - Short rate volatility (sigma); prices depend on `σ²` only
///
/// # Example
///
/// ```
/// use pricer_models::models::rates::HullWhiteParams;
///
/// let params = HullWhiteParams::new(0.05, 0.01).unwrap();
/// assert!((params.b_factor(5.0) - (1.0 - (-0.25_f64).exp()) / 0.05).abs() < 1e-12);
///
/// assert!(HullWhiteParams::new(f64::NAN, 0.01).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HullWhiteParams {
    /// Mean reversion speed (a)
    pub mean_reversion: f64,
    /// Volatility of short rate (sigma)
    pub volatility: f64,
}

impl HullWhiteParams {
    /// Create new Hull-White parameters.
    ///
    /// Any finite pair is accepted. Negative mean reversion is a valid
    /// (explosive) Gaussian model and is priced by the same formulas.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` if either value is not finite.
    pub fn new(mean_reversion: f64, volatility: f64) -> Result<Self, AnalyticalError> {
        if !(mean_reversion.is_finite() && volatility.is_finite()) {
            return Err(AnalyticalError::InvalidModelParameters {
                mean_reversion,
                volatility,
            });
        }
        Ok(Self {
            mean_reversion,
            volatility,
        })
    }

    /// `B(τ) = (1 - e^{-aτ}) / a`, equal to `τ` at `a = 0`.
    #[inline]
    pub fn b_factor(&self, tau: f64) -> f64 {
        tau * phi(self.mean_reversion * tau)
    }

    /// `V(T) = (1 - e^{-2aT}) / 2a`, equal to `T` at `a = 0`.
    ///
    /// The short-rate variance at `T` is `σ² V(T)`.
    #[inline]
    pub fn variance_factor(&self, t: f64) -> f64 {
        t * phi(2.0 * self.mean_reversion * t)
    }

    /// Volatility of `P(T, S)` seen from today, for an option expiring at `T`.
    #[inline]
    pub fn bond_option_volatility(&self, expiry: f64, maturity: f64) -> f64 {
        self.volatility.abs()
            * self.variance_factor(expiry).sqrt()
            * self.b_factor(maturity - expiry)
    }

    /// European option on the zero-coupon bond `P(T, S)`.
    ///
    /// `expiry_discount` is `P(0, T)` and `maturity_discount` is `P(0, S)`.
    ///
    /// ```text
    /// h   = ln(P(0,S) / (P(0,T) X)) / σ_p + σ_p / 2
    /// ZBC = P(0,S) N(h) - X P(0,T) N(h - σ_p)
    /// ZBP = X P(0,T) N(σ_p - h) - P(0,S) N(-h)
    /// ```
    pub fn zero_bond_option(
        &self,
        expiry: f64,
        maturity: f64,
        expiry_discount: f64,
        maturity_discount: f64,
        strike: f64,
        option_type: BondOptionType,
    ) -> f64 {
        let sigma_p = self.bond_option_volatility(expiry, maturity);
        let strike_pv = strike * expiry_discount;

        if sigma_p < MIN_BOND_VOLATILITY {
            return match option_type {
                BondOptionType::Call => (maturity_discount - strike_pv).max(0.0),
                BondOptionType::Put => (strike_pv - maturity_discount).max(0.0),
            };
        }

        let h = (maturity_discount / strike_pv).ln() / sigma_p + 0.5 * sigma_p;
        let value = match option_type {
            BondOptionType::Call => {
                maturity_discount * norm_cdf(h) - strike_pv * norm_cdf(h - sigma_p)
            }
            BondOptionType::Put => {
                strike_pv * norm_cdf(sigma_p - h) - maturity_discount * norm_cdf(-h)
            }
        };
        value.max(0.0)
    }

    /// Price a European swaption per unit notional by Jamshidian's
    /// decomposition.
    ///
    /// The fixed leg is a coupon bond paying `K τ_i` at each `t_i` plus the
    /// notional at the end. A payer swaption is a put on that bond struck at
    /// par and a receiver swaption is a call. The critical rate `r*` solves
    /// `Σ c_i A(T, t_i) e^{-B(t_i - T) r*} = 1` and each zero bond is
    /// struck at `X_i = A(T, t_i) e^{-B(t_i - T) r*}`.
    ///
    /// # Errors
    ///
    /// - `InvalidStrike` if the strike is not finite
    /// - `NumericalInstability` if no critical rate can be bracketed
    pub fn swaption_price(
        &self,
        swaption: &DiscountedSwaption,
        strike: f64,
        swaption_type: SwaptionType,
    ) -> Result<f64, AnalyticalError> {
        if !strike.is_finite() {
            return Err(AnalyticalError::InvalidStrike { strike });
        }

        let expiry = swaption.expiry();
        let p_expiry = swaption.expiry_discount();
        let f_expiry = swaption.expiry_forward();
        let half_variance = 0.5 * self.volatility * self.volatility * self.variance_factor(expiry);

        let n = swaption.payment_times().len();
        let mut coupons = Vec::with_capacity(n);
        let mut b_factors = Vec::with_capacity(n);
        let mut a_factors = Vec::with_capacity(n);
        for (i, ((&t, &tau), &df)) in swaption
            .payment_times()
            .iter()
            .zip(swaption.accruals())
            .zip(swaption.discounts())
            .enumerate()
        {
            let b = self.b_factor(t - expiry);
            let a = df / p_expiry * (b * f_expiry - half_variance * b * b).exp();
            let notional = if i + 1 == n { 1.0 } else { 0.0 };
            coupons.push(strike * tau + notional);
            b_factors.push(b);
            a_factors.push(a);
        }

        let bond_at = |r: f64| -> f64 {
            coupons
                .iter()
                .zip(&a_factors)
                .zip(&b_factors)
                .map(|((c, a), b)| c * a * (-b * r).exp())
                .sum::<f64>()
                - 1.0
        };

        let solver = BrentSolver::new(SolverConfig::new(CRITICAL_RATE_TOLERANCE, 200));
        let critical_rate =
            solver.find_root_expanding(bond_at, f_expiry, CRITICAL_RATE_HALF_WIDTH)?;

        let option_type = match swaption_type {
            SwaptionType::Payer => BondOptionType::Put,
            SwaptionType::Receiver => BondOptionType::Call,
        };

        let price = swaption
            .payment_times()
            .iter()
            .zip(swaption.discounts())
            .zip(coupons.iter().zip(a_factors.iter().zip(&b_factors)))
            .map(|((&t, &df), (&c, (&a, &b)))| {
                let bond_strike = a * (-b * critical_rate).exp();
                c * self.zero_bond_option(expiry, t, p_expiry, df, bond_strike, option_type)
            })
            .sum::<f64>();

        if !price.is_finite() {
            return Err(AnalyticalError::NumericalInstability {
                message: format!(
                    "non-finite Hull-White price for a = {}, σ = {}",
                    self.mean_reversion, self.volatility
                ),
            });
        }
        Ok(price)
    }
}
