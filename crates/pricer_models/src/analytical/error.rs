//! Error types for analytical pricing operations.

use pricer_core::market_data::MarketDataError;
use pricer_core::types::{PricingError, SolverError};
use thiserror::Error;

/// Analytical pricing errors.
///
/// # Variants
/// - `InvalidVolatility`: Negative or non-finite volatility
/// - `InvalidForward`: Non-positive forward under the log-normal convention
/// - `InvalidStrike`: Non-positive strike under the log-normal convention
/// - `InvalidExpiry`: Negative or non-finite time to expiry
/// - `InvalidAnnuity`: Annuity too small or non-finite to divide by
/// - `InvalidSchedule`: Swap schedule cannot be built
/// - `InvalidModelParameters`: Non-finite model parameters
/// - `MarketData`: Curve lookup failed
/// - `NumericalInstability`: Computation encountered numerical issues
///
/// # Examples
/// ```
/// use pricer_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidAnnuity { annuity: 0.0 };
/// assert!(format!("{}", err).contains("annuity"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Invalid volatility (negative or non-finite).
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// The invalid volatility value
        volatility: f64,
    },

    /// Forward rate outside the formula's domain.
    #[error("Invalid forward swap rate: F = {forward}")]
    InvalidForward {
        /// The invalid forward rate
        forward: f64,
    },

    /// Strike outside the formula's domain.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike
        strike: f64,
    },

    /// Invalid time to expiry.
    #[error("Invalid expiry: T = {expiry}")]
    InvalidExpiry {
        /// The invalid expiry
        expiry: f64,
    },

    /// Annuity is too small or not finite.
    #[error("Degenerate annuity: A = {annuity}")]
    InvalidAnnuity {
        /// The offending annuity
        annuity: f64,
    },

    /// Swap schedule cannot be built.
    #[error("Invalid swap schedule: {message}")]
    InvalidSchedule {
        /// What is wrong with the schedule
        message: String,
    },

    /// Model parameters are not finite.
    #[error("Invalid model parameters: a = {mean_reversion}, σ = {volatility}")]
    InvalidModelParameters {
        /// Mean reversion speed
        mean_reversion: f64,
        /// Short-rate volatility
        volatility: f64,
    },

    /// Curve lookup failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Numerical instability during computation.
    #[error("Numerical instability: {message}")]
    NumericalInstability {
        /// Description of the numerical issue
        message: String,
    },
}

impl From<SolverError> for AnalyticalError {
    fn from(err: SolverError) -> Self {
        AnalyticalError::NumericalInstability {
            message: err.to_string(),
        }
    }
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        match err {
            AnalyticalError::InvalidVolatility { .. }
            | AnalyticalError::InvalidExpiry { .. }
            | AnalyticalError::InvalidSchedule { .. }
            | AnalyticalError::InvalidModelParameters { .. } => {
                PricingError::InvalidInput(err.to_string())
            }
            AnalyticalError::MarketData(inner) => inner.into(),
            AnalyticalError::InvalidForward { .. }
            | AnalyticalError::InvalidStrike { .. }
            | AnalyticalError::InvalidAnnuity { .. } => PricingError::ModelFailure(err.to_string()),
            AnalyticalError::NumericalInstability { .. } => {
                PricingError::NumericalInstability(err.to_string())
            }
        }
    }
}
