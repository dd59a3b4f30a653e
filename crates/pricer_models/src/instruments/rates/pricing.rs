//! Market-standard swaption formulas on a [`DiscountedSwaption`].
//!
//! Prices are per unit notional:
//!
//! ```text
//! Black-76  payer:  A · [F N(d1) - K N(d2)],    d1,2 = (ln(F/K) ± σ²T/2) / σ√T
//! Bachelier payer:  A · [(F - K) N(d) + σ√T n(d)],  d = (F - K) / σ√T
//! ```
//!
//! Receivers follow by put-call parity. A zero total volatility `σ√T`
//! returns the discounted intrinsic value.

use super::swaption::{DiscountedSwaption, SwaptionType, VolatilityType};
use crate::analytical::distributions::{norm_cdf, norm_pdf};
use crate::analytical::AnalyticalError;

/// Total volatility below which the option is worth its intrinsic value.
const MIN_TOTAL_VOLATILITY: f64 = 1e-16;

fn validate_volatility(volatility: f64) -> Result<(), AnalyticalError> {
    if volatility.is_finite() && volatility >= 0.0 {
        Ok(())
    } else {
        Err(AnalyticalError::InvalidVolatility { volatility })
    }
}

fn intrinsic(swaption: &DiscountedSwaption, strike: f64, swaption_type: SwaptionType) -> f64 {
    let moneyness = match swaption_type {
        SwaptionType::Payer => swaption.forward() - strike,
        SwaptionType::Receiver => strike - swaption.forward(),
    };
    swaption.annuity() * moneyness.max(0.0)
}

/// Price a swaption with the Black-76 (log-normal) formula.
///
/// # Errors
///
/// - `InvalidVolatility` for a negative or non-finite volatility
/// - `InvalidForward` / `InvalidStrike` when either is not positive
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::ZeroCurve;
/// use pricer_models::instruments::rates::{
///     price_swaption_black76, DiscountedSwaption, SwaptionSchedule, SwaptionType,
/// };
///
/// let curve = ZeroCurve::flat(0.03_f64);
/// let swaption =
///     DiscountedSwaption::new(&curve, &SwaptionSchedule::new(1.0, 5.0, 1.0).unwrap()).unwrap();
/// let atm = swaption.forward();
///
/// let payer = price_swaption_black76(&swaption, atm, 0.2, SwaptionType::Payer).unwrap();
/// let receiver = price_swaption_black76(&swaption, atm, 0.2, SwaptionType::Receiver).unwrap();
/// assert!((payer - receiver).abs() < 1e-10);
/// ```
pub fn price_swaption_black76(
    swaption: &DiscountedSwaption,
    strike: f64,
    volatility: f64,
    swaption_type: SwaptionType,
) -> Result<f64, AnalyticalError> {
    validate_volatility(volatility)?;
    let forward = swaption.forward();
    if forward <= 0.0 {
        return Err(AnalyticalError::InvalidForward { forward });
    }
    if !(strike.is_finite() && strike > 0.0) {
        return Err(AnalyticalError::InvalidStrike { strike });
    }

    let total_vol = volatility * swaption.expiry().sqrt();
    if total_vol < MIN_TOTAL_VOLATILITY {
        return Ok(intrinsic(swaption, strike, swaption_type));
    }

    let d1 = ((forward / strike).ln() + 0.5 * total_vol * total_vol) / total_vol;
    let d2 = d1 - total_vol;

    let undiscounted = match swaption_type {
        SwaptionType::Payer => forward * norm_cdf(d1) - strike * norm_cdf(d2),
        SwaptionType::Receiver => strike * norm_cdf(-d2) - forward * norm_cdf(-d1),
    };
    Ok(swaption.annuity() * undiscounted.max(0.0))
}

/// Price a swaption with the Bachelier (normal) formula.
///
/// Works for any sign of forward and strike.
///
/// # Errors
///
/// - `InvalidVolatility` for a negative or non-finite volatility
/// - `InvalidStrike` for a non-finite strike
pub fn price_swaption_bachelier(
    swaption: &DiscountedSwaption,
    strike: f64,
    volatility: f64,
    swaption_type: SwaptionType,
) -> Result<f64, AnalyticalError> {
    validate_volatility(volatility)?;
    if !strike.is_finite() {
        return Err(AnalyticalError::InvalidStrike { strike });
    }

    let total_vol = volatility * swaption.expiry().sqrt();
    if total_vol < MIN_TOTAL_VOLATILITY {
        return Ok(intrinsic(swaption, strike, swaption_type));
    }

    let moneyness = match swaption_type {
        SwaptionType::Payer => swaption.forward() - strike,
        SwaptionType::Receiver => strike - swaption.forward(),
    };
    let d = moneyness / total_vol;
    let undiscounted = moneyness * norm_cdf(d) + total_vol * norm_pdf(d);
    Ok(swaption.annuity() * undiscounted.max(0.0))
}

/// Price a swaption with the formula matching `volatility_type`.
pub fn price_swaption(
    swaption: &DiscountedSwaption,
    strike: f64,
    volatility: f64,
    volatility_type: VolatilityType,
    swaption_type: SwaptionType,
) -> Result<f64, AnalyticalError> {
    match volatility_type {
        VolatilityType::LogNormal => {
            price_swaption_black76(swaption, strike, volatility, swaption_type)
        }
        VolatilityType::Normal => {
            price_swaption_bachelier(swaption, strike, volatility, swaption_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::rates::SwaptionSchedule;
    use approx::assert_relative_eq;
    use pricer_core::market_data::curves::ZeroCurve;
    use proptest::prelude::*;

    fn swaption(rate: f64, expiry: f64, tenor: f64) -> DiscountedSwaption {
        let curve = ZeroCurve::flat(rate);
        let schedule = SwaptionSchedule::new(expiry, tenor, 1.0).unwrap();
        DiscountedSwaption::new(&curve, &schedule).unwrap()
    }

    // ========================================
    // Black-76 Tests
    // ========================================

    #[test]
    fn test_black76_atm_closed_form() {
        // ATM: A · F · (2N(σ√T/2) - 1)
        let s = swaption(0.02, 5.0, 5.0);
        let vol = 0.2_f64;
        let price = price_swaption_black76(&s, s.forward(), vol, SwaptionType::Payer).unwrap();
        let expected =
            s.annuity() * s.forward() * (2.0 * norm_cdf(0.5 * vol * 5.0_f64.sqrt()) - 1.0);
        assert_relative_eq!(price, expected, epsilon = 1e-14);
    }

    #[test]
    fn test_black76_put_call_parity() {
        let s = swaption(0.03, 2.0, 5.0);
        let k = 0.025;
        let payer = price_swaption_black76(&s, k, 0.3, SwaptionType::Payer).unwrap();
        let receiver = price_swaption_black76(&s, k, 0.3, SwaptionType::Receiver).unwrap();
        assert_relative_eq!(
            payer - receiver,
            s.annuity() * (s.forward() - k),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_black76_zero_vol_is_intrinsic() {
        let s = swaption(0.03, 2.0, 5.0);
        let k = 0.8 * s.forward();
        let payer = price_swaption_black76(&s, k, 0.0, SwaptionType::Payer).unwrap();
        assert_relative_eq!(payer, s.annuity() * (s.forward() - k), epsilon = 1e-15);
        let receiver = price_swaption_black76(&s, k, 0.0, SwaptionType::Receiver).unwrap();
        assert_eq!(receiver, 0.0);
    }

    #[test]
    fn test_black76_rejects_non_positive_forward() {
        let s = swaption(0.0, 1.0, 5.0);
        assert!(matches!(
            price_swaption_black76(&s, 0.01, 0.2, SwaptionType::Payer),
            Err(AnalyticalError::InvalidForward { .. })
        ));
    }

    #[test]
    fn test_black76_rejects_negative_vol() {
        let s = swaption(0.02, 1.0, 5.0);
        assert!(matches!(
            price_swaption_black76(&s, 0.02, -0.1, SwaptionType::Payer),
            Err(AnalyticalError::InvalidVolatility { .. })
        ));
    }

    // ========================================
    // Bachelier Tests
    // ========================================

    #[test]
    fn test_bachelier_atm_closed_form() {
        // ATM: A · σ√T / √(2π)
        let s = swaption(0.02, 4.0, 5.0);
        let vol = 0.006;
        let price =
            price_swaption_bachelier(&s, s.forward(), vol, SwaptionType::Receiver).unwrap();
        assert_relative_eq!(price, s.annuity() * vol * 2.0 * norm_pdf(0.0), epsilon = 1e-15);
    }

    #[test]
    fn test_bachelier_handles_zero_forward() {
        let s = swaption(0.0, 1.0, 5.0);
        let price = price_swaption_bachelier(&s, 0.0, 0.005, SwaptionType::Payer).unwrap();
        assert!(price > 0.0);
    }

    #[test]
    fn test_dispatch_by_volatility_type() {
        let s = swaption(0.02, 1.0, 5.0);
        let k = s.forward();
        let black =
            price_swaption(&s, k, 0.2, VolatilityType::LogNormal, SwaptionType::Payer).unwrap();
        let normal =
            price_swaption(&s, k, 0.2, VolatilityType::Normal, SwaptionType::Payer).unwrap();
        assert_relative_eq!(
            black,
            price_swaption_black76(&s, k, 0.2, SwaptionType::Payer).unwrap()
        );
        assert!(normal > black);
    }

    proptest! {
        #[test]
        fn prop_prices_non_negative(
            rate in 0.001..0.1f64,
            expiry in 0.0..20.0f64,
            tenor in 0.25..20.0f64,
            vol in 0.0..1.0f64,
            strike_shift in -0.5..0.5f64,
        ) {
            let s = swaption(rate, expiry, tenor);
            let k = s.forward() * (1.0 + strike_shift);
            for side in [SwaptionType::Payer, SwaptionType::Receiver] {
                let black = price_swaption_black76(&s, k, vol, side).unwrap();
                let normal = price_swaption_bachelier(&s, k, vol * 0.01, side).unwrap();
                prop_assert!(black.is_finite() && black >= 0.0);
                prop_assert!(normal.is_finite() && normal >= 0.0);
            }
        }
    }
}
