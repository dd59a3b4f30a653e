//! Market data error types.
//!
//! This module provides structured error handling for curve construction
//! and lookups.

use crate::types::PricingError;
use thiserror::Error;

/// Market data operation errors.
///
/// # Variants
///
/// - `InvalidMaturity`: Negative, non-finite or out-of-order pillar time
/// - `InsufficientData`: Not enough data points for construction
/// - `LengthMismatch`: Pillar dates and rates differ in length
/// - `NonFiniteRate`: A pillar rate is NaN or infinite
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InvalidMaturity { t: -1.0 };
/// assert!(format!("{}", err).contains("-1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarketDataError {
    /// Invalid maturity (negative or out-of-order time).
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// Insufficient data for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Pillar times and rates have different lengths.
    #[error("Length mismatch: {dates} dates but {rates} rates")]
    LengthMismatch {
        /// Number of pillar dates
        dates: usize,
        /// Number of pillar rates
        rates: usize,
    },

    /// A pillar rate is not a finite number.
    #[error("Non-finite rate at t = {t}")]
    NonFiniteRate {
        /// Pillar time carrying the bad rate
        t: f64,
    },
}

impl From<MarketDataError> for PricingError {
    fn from(err: MarketDataError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_maturity_display() {
        let err = MarketDataError::InvalidMaturity { t: -1.5 };
        assert_eq!(format!("{}", err), "Invalid maturity: t = -1.5");
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = MarketDataError::LengthMismatch { dates: 3, rates: 2 };
        assert_eq!(format!("{}", err), "Length mismatch: 3 dates but 2 rates");
    }

    #[test]
    fn test_into_pricing_error() {
        let err: PricingError = MarketDataError::InsufficientData { got: 0, need: 1 }.into();
        match err {
            PricingError::InvalidInput(msg) => assert!(msg.contains("got 0")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}
