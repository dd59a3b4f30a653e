//! Zero-rate curve built from `(time, rate)` pillars.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;
use chrono::NaiveDate;
use num_traits::Float;

/// Days per year for ACT/365 Fixed pillar conversion.
const DAYS_PER_YEAR: f64 = 365.0;

/// Zero-coupon discount curve.
///
/// Stores continuously compounded zero rates at strictly increasing pillar
/// times (years from the valuation date). Rates are interpolated linearly
/// between pillars and extrapolated flat outside them, so a single pillar
/// describes a flat curve.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`)
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{YieldCurve, ZeroCurve};
///
/// let curve = ZeroCurve::<f64>::new(&[1.0, 2.0, 5.0], &[0.02, 0.025, 0.03]).unwrap();
///
/// // Halfway between the 1Y and 2Y pillars
/// let r = curve.zero_rate(1.5).unwrap();
/// assert!((r - 0.0225).abs() < 1e-12);
///
/// // Flat beyond the last pillar
/// assert!((curve.zero_rate(30.0).unwrap() - 0.03).abs() < 1e-12);
///
/// // The raw pillars are kept for reporting
/// assert_eq!(curve.dates(), &[1.0, 2.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ZeroCurve<T: Float> {
    /// Pillar times in years, strictly increasing
    dates: Vec<T>,
    /// Continuously compounded zero rates at each pillar
    rates: Vec<T>,
}

impl<T: Float> ZeroCurve<T> {
    /// Construct a curve from pillar times and zero rates.
    ///
    /// # Arguments
    ///
    /// * `dates` - Pillar times in years (finite, >= 0, strictly increasing)
    /// * `rates` - Continuously compounded zero rate at each pillar
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InsufficientData)` - No pillars supplied
    /// * `Err(MarketDataError::LengthMismatch)` - `dates` and `rates` differ in length
    /// * `Err(MarketDataError::InvalidMaturity)` - Negative, non-finite or unordered time
    /// * `Err(MarketDataError::NonFiniteRate)` - A rate is NaN or infinite
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::market_data::curves::ZeroCurve;
    ///
    /// assert!(ZeroCurve::<f64>::new(&[1.0, 2.0], &[0.01, 0.02]).is_ok());
    /// assert!(ZeroCurve::<f64>::new(&[2.0, 1.0], &[0.01, 0.02]).is_err());
    /// assert!(ZeroCurve::<f64>::new(&[], &[]).is_err());
    /// ```
    pub fn new(dates: &[T], rates: &[T]) -> Result<Self, MarketDataError> {
        if dates.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }

        if dates.len() != rates.len() {
            return Err(MarketDataError::LengthMismatch {
                dates: dates.len(),
                rates: rates.len(),
            });
        }

        for (i, (&t, &r)) in dates.iter().zip(rates).enumerate() {
            let invalid_time = !t.is_finite() || t < T::zero() || (i > 0 && t <= dates[i - 1]);
            if invalid_time {
                return Err(MarketDataError::InvalidMaturity {
                    t: t.to_f64().unwrap_or(f64::NAN),
                });
            }
            if !r.is_finite() {
                return Err(MarketDataError::NonFiniteRate {
                    t: t.to_f64().unwrap_or(f64::NAN),
                });
            }
        }

        Ok(Self {
            dates: dates.to_vec(),
            rates: rates.to_vec(),
        })
    }

    /// Construct a flat curve from a single pillar at `t = 0`.
    pub fn flat(rate: T) -> Self {
        Self {
            dates: vec![T::zero()],
            rates: vec![rate],
        }
    }

    /// Construct a curve from calendar-dated pillars.
    ///
    /// Pillar dates are converted to year fractions from `valuation_date`
    /// with the ACT/365 Fixed convention.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use pricer_core::market_data::curves::ZeroCurve;
    ///
    /// let valuation = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let pillars = [
    ///     (NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), 0.02_f64),
    ///     (NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(), 0.025),
    /// ];
    /// let curve = ZeroCurve::from_dated_pillars(valuation, &pillars).unwrap();
    /// assert!((curve.dates()[0] - 365.0 / 365.0).abs() < 1e-12);
    /// ```
    pub fn from_dated_pillars(
        valuation_date: NaiveDate,
        pillars: &[(NaiveDate, T)],
    ) -> Result<Self, MarketDataError> {
        let mut dates = Vec::with_capacity(pillars.len());
        let mut rates = Vec::with_capacity(pillars.len());
        for &(date, rate) in pillars {
            let days = (date - valuation_date).num_days() as f64;
            let t = T::from(days / DAYS_PER_YEAR).ok_or(MarketDataError::InvalidMaturity {
                t: days / DAYS_PER_YEAR,
            })?;
            dates.push(t);
            rates.push(rate);
        }
        Self::new(&dates, &rates)
    }

    /// Pillar times in years.
    #[inline]
    pub fn dates(&self) -> &[T] {
        &self.dates
    }

    /// Zero rates at the pillars.
    #[inline]
    pub fn rates(&self) -> &[T] {
        &self.rates
    }

    /// Number of pillars.
    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always `false`: construction rejects empty pillar sets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Interpolated zero rate at `t`, flat outside the pillar range.
    fn interpolate(&self, t: T) -> T {
        let n = self.dates.len();
        if t <= self.dates[0] {
            return self.rates[0];
        }
        if t >= self.dates[n - 1] {
            return self.rates[n - 1];
        }

        // First pillar strictly greater than t; 1 <= upper <= n - 1 here
        let upper = self.dates.partition_point(|&d| d <= t);
        let (t0, t1) = (self.dates[upper - 1], self.dates[upper]);
        let (r0, r1) = (self.rates[upper - 1], self.rates[upper]);
        let w = (t - t0) / (t1 - t0);
        r0 + w * (r1 - r0)
    }
}

impl<T: Float> YieldCurve<T> for ZeroCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() || t.is_nan() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok((-self.interpolate(t) * t).exp())
    }

    /// Interpolated zero rate; at `t = 0` this is the first pillar's rate.
    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() || t.is_nan() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(self.interpolate(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    // ========================================
    // Construction Tests
    // ========================================

    #[test]
    fn test_single_pillar_is_flat() {
        let curve = ZeroCurve::new(&[5.0], &[0.02]).unwrap();
        for t in [0.0, 0.5, 5.0, 40.0] {
            assert_relative_eq!(curve.zero_rate(t).unwrap(), 0.02);
        }
        assert_relative_eq!(curve.discount_factor(10.0).unwrap(), (-0.2_f64).exp());
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = ZeroCurve::new(&[1.0, 2.0], &[0.01]).unwrap_err();
        assert_eq!(err, MarketDataError::LengthMismatch { dates: 2, rates: 1 });
    }

    #[test]
    fn test_rejects_duplicate_pillar() {
        let err = ZeroCurve::new(&[1.0, 1.0], &[0.01, 0.02]).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidMaturity { t } if t == 1.0));
    }

    #[test]
    fn test_rejects_negative_time_and_nan_rate() {
        assert!(ZeroCurve::new(&[-1.0, 1.0], &[0.01, 0.02]).is_err());
        assert!(matches!(
            ZeroCurve::new(&[1.0, 2.0], &[0.01, f64::NAN]),
            Err(MarketDataError::NonFiniteRate { .. })
        ));
    }

    #[test]
    fn test_from_dated_pillars_act365() {
        let valuation = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let pillars = [
            (NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 0.02),
            (NaiveDate::from_ymd_opt(2029, 3, 1).unwrap(), 0.03),
        ];
        let curve = ZeroCurve::from_dated_pillars(valuation, &pillars).unwrap();
        assert_relative_eq!(curve.dates()[0], 365.0 / 365.0);
        assert_relative_eq!(curve.dates()[1], 1826.0 / 365.0);
        assert_eq!(curve.rates(), &[0.02, 0.03]);
    }

    #[test]
    fn test_from_dated_pillars_before_valuation() {
        let valuation = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let pillars = [(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(), 0.02)];
        assert!(ZeroCurve::from_dated_pillars(valuation, &pillars).is_err());
    }

    // ========================================
    // Interpolation Tests
    // ========================================

    #[test]
    fn test_linear_interpolation_between_pillars() {
        let curve = ZeroCurve::new(&[1.0, 3.0], &[0.01, 0.03]).unwrap();
        assert_relative_eq!(curve.zero_rate(2.0).unwrap(), 0.02, epsilon = 1e-15);
        assert_relative_eq!(curve.zero_rate(1.0).unwrap(), 0.01);
        assert_relative_eq!(curve.zero_rate(3.0).unwrap(), 0.03);
    }

    #[test]
    fn test_flat_extrapolation() {
        let curve = ZeroCurve::new(&[1.0, 3.0], &[0.01, 0.03]).unwrap();
        assert_relative_eq!(curve.zero_rate(0.25).unwrap(), 0.01);
        assert_relative_eq!(curve.zero_rate(50.0).unwrap(), 0.03);
    }

    #[test]
    fn test_discount_factor_origin_and_negative() {
        let curve = ZeroCurve::new(&[1.0, 3.0], &[0.01, 0.03]).unwrap();
        assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
        assert!(curve.discount_factor(-0.1).is_err());
    }

    proptest! {
        #[test]
        fn prop_discount_factor_positive_and_bounded(t in 0.0f64..60.0) {
            let curve = ZeroCurve::new(&[0.5, 2.0, 10.0, 30.0], &[0.01, 0.015, 0.025, 0.03]).unwrap();
            let df = curve.discount_factor(t).unwrap();
            prop_assert!(df > 0.0 && df <= 1.0);
        }

        #[test]
        fn prop_interpolated_rate_within_pillar_range(t in 0.0f64..60.0) {
            let curve = ZeroCurve::new(&[0.5, 2.0, 10.0], &[0.03, 0.01, 0.02]).unwrap();
            let r = curve.zero_rate(t).unwrap();
            prop_assert!((0.01..=0.03).contains(&r));
        }
    }
}
