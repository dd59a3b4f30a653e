//! European swaptions on a fixed-for-floating swap.
//!
//! A swaption is described by its expiry `T`, the underlying swap's length
//! `Δ` and the fixed-leg payment interval. [`SwaptionSchedule`] lays out the
//! fixed-leg payment times and [`DiscountedSwaption`] binds that schedule to
//! a zero curve, computing once the discount factors, annuity and forward
//! swap rate that every pricer needs.
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::curves::ZeroCurve;
//! use pricer_models::instruments::rates::{DiscountedSwaption, SwaptionSchedule};
//!
//! let curve = ZeroCurve::flat(0.02);
//! let schedule = SwaptionSchedule::new(1.0, 2.5, 1.0).unwrap();
//! assert_eq!(schedule.payment_times(), &[2.0, 3.0, 3.5]);
//! assert_eq!(schedule.accruals(), &[1.0, 1.0, 0.5]);
//!
//! let swaption = DiscountedSwaption::new(&curve, &schedule).unwrap();
//! assert!(swaption.annuity() > 0.0);
//! ```

use std::fmt;

use pricer_core::market_data::curves::YieldCurve;

use crate::analytical::AnalyticalError;

/// Annuities at or below this are treated as degenerate.
pub const MIN_ANNUITY: f64 = 1e-12;

/// Relative tolerance for treating `duration / step` as a whole number.
const WHOLE_PERIOD_TOLERANCE: f64 = 1e-9;

/// Swaption type (payer or receiver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwaptionType {
    /// Right to enter a payer swap (pay fixed, receive floating).
    #[default]
    Payer,
    /// Right to enter a receiver swap (receive fixed, pay floating).
    Receiver,
}

impl fmt::Display for SwaptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwaptionType::Payer => write!(f, "Payer"),
            SwaptionType::Receiver => write!(f, "Receiver"),
        }
    }
}

/// Quoting convention of a swaption volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VolatilityType {
    /// Log-normal (Black-76) volatility.
    #[default]
    LogNormal,
    /// Normal (Bachelier) volatility, in absolute rate units.
    Normal,
}

impl fmt::Display for VolatilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityType::LogNormal => write!(f, "LogNormal"),
            VolatilityType::Normal => write!(f, "Normal"),
        }
    }
}

/// Fixed-leg payment schedule of the swap underlying a swaption.
///
/// Payments fall at `T + step, T + 2·step, ...` up to `T + Δ`. When `Δ` is
/// not a whole number of steps the final period is a short stub ending at
/// `T + Δ`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwaptionSchedule {
    expiry: f64,
    payment_times: Vec<f64>,
    accruals: Vec<f64>,
}

impl SwaptionSchedule {
    /// Build the schedule for a swaption expiring at `expiry` on a swap of
    /// length `duration`, paying fixed every `step` years.
    ///
    /// # Errors
    ///
    /// - `InvalidExpiry` if `expiry` is negative or not finite
    /// - `InvalidSchedule` if `duration` or `step` is not positive and finite
    pub fn new(expiry: f64, duration: f64, step: f64) -> Result<Self, AnalyticalError> {
        if !(expiry.is_finite() && expiry >= 0.0) {
            return Err(AnalyticalError::InvalidExpiry { expiry });
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(AnalyticalError::InvalidSchedule {
                message: format!("swap length must be positive, got {}", duration),
            });
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(AnalyticalError::InvalidSchedule {
                message: format!("payment step must be positive, got {}", step),
            });
        }

        let ratio = duration / step;
        let whole = ratio.round();
        let n_periods = if (ratio - whole).abs() <= WHOLE_PERIOD_TOLERANCE * ratio.max(1.0) {
            whole.max(1.0) as usize
        } else {
            ratio.ceil() as usize
        };

        let end = expiry + duration;
        let mut payment_times = Vec::with_capacity(n_periods);
        let mut accruals = Vec::with_capacity(n_periods);
        let mut previous = expiry;
        for i in 1..=n_periods {
            let t = if i == n_periods {
                end
            } else {
                expiry + i as f64 * step
            };
            payment_times.push(t);
            accruals.push(t - previous);
            previous = t;
        }

        Ok(Self {
            expiry,
            payment_times,
            accruals,
        })
    }

    /// Option expiry (swap start) in years.
    #[inline]
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    /// Swap end in years.
    #[inline]
    pub fn end(&self) -> f64 {
        self.payment_times.last().copied().unwrap_or(self.expiry)
    }

    /// Fixed-leg payment times.
    #[inline]
    pub fn payment_times(&self) -> &[f64] {
        &self.payment_times
    }

    /// Accrual fraction of each fixed period.
    #[inline]
    pub fn accruals(&self) -> &[f64] {
        &self.accruals
    }
}

/// A swaption schedule discounted on a specific zero curve.
///
/// Holds everything the Black-76, Bachelier and Hull-White pricers read
/// from the curve, so that repeated pricing never touches the curve again.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountedSwaption {
    expiry: f64,
    expiry_discount: f64,
    expiry_forward: f64,
    payment_times: Vec<f64>,
    accruals: Vec<f64>,
    discounts: Vec<f64>,
    annuity: f64,
    forward: f64,
}

impl DiscountedSwaption {
    /// Discount `schedule` on `curve`.
    ///
    /// Computes the annuity `A = Σ τ_i P(0, t_i)` and the forward swap rate
    /// `F = (P(0, T) - P(0, T + Δ)) / A`.
    ///
    /// # Errors
    ///
    /// - `MarketData` if the curve cannot be queried
    /// - `InvalidAnnuity` if `A <= 1e-12` or is not finite
    pub fn new<C>(curve: &C, schedule: &SwaptionSchedule) -> Result<Self, AnalyticalError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        let expiry = schedule.expiry();
        let expiry_discount = curve.discount_factor(expiry)?;
        let expiry_forward = curve.instantaneous_forward(expiry)?;

        let discounts = schedule
            .payment_times()
            .iter()
            .map(|&t| curve.discount_factor(t))
            .collect::<Result<Vec<_>, _>>()?;

        let annuity: f64 = schedule
            .accruals()
            .iter()
            .zip(&discounts)
            .map(|(tau, df)| tau * df)
            .sum();
        if !annuity.is_finite() || annuity <= MIN_ANNUITY {
            return Err(AnalyticalError::InvalidAnnuity { annuity });
        }

        let end_discount = discounts.last().copied().unwrap_or(expiry_discount);
        let forward = (expiry_discount - end_discount) / annuity;
        if !forward.is_finite() {
            return Err(AnalyticalError::InvalidForward { forward });
        }
        if !expiry_forward.is_finite() {
            return Err(AnalyticalError::NumericalInstability {
                message: format!("instantaneous forward at T = {} is not finite", expiry),
            });
        }

        Ok(Self {
            expiry,
            expiry_discount,
            expiry_forward,
            payment_times: schedule.payment_times().to_vec(),
            accruals: schedule.accruals().to_vec(),
            discounts,
            annuity,
            forward,
        })
    }

    /// Time to expiry in years.
    #[inline]
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    /// `P(0, T)`.
    #[inline]
    pub fn expiry_discount(&self) -> f64 {
        self.expiry_discount
    }

    /// Instantaneous forward rate `f(0, T)`.
    #[inline]
    pub fn expiry_forward(&self) -> f64 {
        self.expiry_forward
    }

    /// Fixed-leg payment times.
    #[inline]
    pub fn payment_times(&self) -> &[f64] {
        &self.payment_times
    }

    /// Accrual fraction of each fixed period.
    #[inline]
    pub fn accruals(&self) -> &[f64] {
        &self.accruals
    }

    /// `P(0, t_i)` for each payment time.
    #[inline]
    pub fn discounts(&self) -> &[f64] {
        &self.discounts
    }

    /// Annuity (PV01 of the fixed leg per unit rate).
    #[inline]
    pub fn annuity(&self) -> f64 {
        self.annuity
    }

    /// Forward swap rate.
    #[inline]
    pub fn forward(&self) -> f64 {
        self.forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::market_data::curves::ZeroCurve;

    // ========================================
    // Schedule Tests
    // ========================================

    #[test]
    fn test_schedule_whole_periods() {
        let schedule = SwaptionSchedule::new(5.0, 5.0, 1.0).unwrap();
        assert_eq!(schedule.payment_times(), &[6.0, 7.0, 8.0, 9.0, 10.0]);
        assert!(schedule.accruals().iter().all(|&a| a == 1.0));
        assert_eq!(schedule.end(), 10.0);
    }

    #[test]
    fn test_schedule_semi_annual() {
        let schedule = SwaptionSchedule::new(1.0, 2.0, 0.5).unwrap();
        assert_eq!(schedule.payment_times().len(), 4);
        assert_relative_eq!(schedule.end(), 3.0);
    }

    #[test]
    fn test_schedule_short_stub() {
        let schedule = SwaptionSchedule::new(2.0, 2.25, 1.0).unwrap();
        assert_eq!(schedule.payment_times(), &[3.0, 4.0, 4.25]);
        assert_relative_eq!(schedule.accruals()[2], 0.25);
    }

    #[test]
    fn test_schedule_step_longer_than_swap() {
        let schedule = SwaptionSchedule::new(1.0, 0.5, 1.0).unwrap();
        assert_eq!(schedule.payment_times(), &[1.5]);
        assert_eq!(schedule.accruals(), &[0.5]);
    }

    #[test]
    fn test_schedule_tolerates_rounding() {
        // 0.1 * 30 is not exactly 3.0 in binary
        let schedule = SwaptionSchedule::new(0.0, 3.0, 0.1).unwrap();
        assert_eq!(schedule.payment_times().len(), 30);
    }

    #[test]
    fn test_schedule_rejects_bad_inputs() {
        assert!(matches!(
            SwaptionSchedule::new(-1.0, 5.0, 1.0),
            Err(AnalyticalError::InvalidExpiry { .. })
        ));
        assert!(SwaptionSchedule::new(1.0, 0.0, 1.0).is_err());
        assert!(SwaptionSchedule::new(1.0, 5.0, 0.0).is_err());
        assert!(SwaptionSchedule::new(1.0, 5.0, f64::NAN).is_err());
    }

    // ========================================
    // Discounting Tests
    // ========================================

    #[test]
    fn test_flat_curve_forward_matches_annual_rate() {
        let r = 0.02_f64;
        let curve = ZeroCurve::flat(r);
        let schedule = SwaptionSchedule::new(5.0, 5.0, 1.0).unwrap();
        let swaption = DiscountedSwaption::new(&curve, &schedule).unwrap();

        // Annual fixed leg on a continuously compounded flat curve
        assert_relative_eq!(swaption.forward(), r.exp() - 1.0, epsilon = 1e-12);
        assert_relative_eq!(swaption.expiry_discount(), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(swaption.expiry_forward(), r, epsilon = 1e-8);
    }

    #[test]
    fn test_annuity_sums_discounted_accruals() {
        let curve = ZeroCurve::new(&[0.0, 10.0], &[0.01, 0.03]).unwrap();
        let schedule = SwaptionSchedule::new(1.0, 3.0, 1.0).unwrap();
        let swaption = DiscountedSwaption::new(&curve, &schedule).unwrap();

        let expected: f64 = [2.0, 3.0, 4.0]
            .iter()
            .map(|&t| curve.discount_factor(t).unwrap())
            .sum();
        assert_relative_eq!(swaption.annuity(), expected, epsilon = 1e-14);
        assert_eq!(swaption.discounts().len(), 3);
    }

    #[test]
    fn test_degenerate_annuity_is_an_error() {
        // Discount factors underflow to zero
        let curve = ZeroCurve::flat(1.0e3);
        let schedule = SwaptionSchedule::new(5.0, 5.0, 1.0).unwrap();
        assert!(matches!(
            DiscountedSwaption::new(&curve, &schedule),
            Err(AnalyticalError::InvalidAnnuity { .. })
        ));
    }

    #[test]
    fn test_zero_rates_give_zero_forward() {
        let curve = ZeroCurve::flat(0.0);
        let schedule = SwaptionSchedule::new(1.0, 5.0, 1.0).unwrap();
        let swaption = DiscountedSwaption::new(&curve, &schedule).unwrap();
        assert_relative_eq!(swaption.annuity(), 5.0);
        assert_eq!(swaption.forward(), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(SwaptionType::Receiver.to_string(), "Receiver");
        assert_eq!(VolatilityType::default().to_string(), "LogNormal");
    }
}
