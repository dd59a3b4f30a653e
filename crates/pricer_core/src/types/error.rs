//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors from pricing operations
//! - `SolverError`: Errors from root-finding and minimisation solvers

use std::fmt;
use thiserror::Error;

/// Categorised pricing errors.
///
/// Provides structured error handling for pricing operations with
/// descriptive context for each failure mode.
///
/// # Variants
/// - `InvalidInput`: Invalid market data or parameters
/// - `NumericalInstability`: Computation produced an undefined value
/// - `ModelFailure`: Model assumptions violated
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("Negative annuity".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: Negative annuity");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PricingError {
    /// Invalid input data or parameters
    InvalidInput(String),

    /// Numerical instability during computation
    NumericalInstability(String),

    /// Model failed to produce valid result
    ModelFailure(String),
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PricingError::NumericalInstability(msg) => {
                write!(f, "Numerical instability: {}", msg)
            }
            PricingError::ModelFailure(msg) => write!(f, "Model failure: {}", msg),
        }
    }
}

impl std::error::Error for PricingError {}

/// Solver errors.
///
/// Returned by root finders and by every [`Minimizer`] strategy. A cancelled
/// solve is reported through [`SolverError::Cancelled`] rather than a panic.
///
/// [`Minimizer`]: crate::math::solvers::Minimizer
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
///
/// let cancelled = SolverError::Cancelled { iterations: 3 };
/// assert!(cancelled.is_cancelled());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Solver settings or problem definition are unusable.
    #[error("Invalid solver configuration: {0}")]
    InvalidConfiguration(String),

    /// The solve was aborted through its cancellation token.
    #[error("Solver aborted by cancellation request after {iterations} iterations")]
    Cancelled {
        /// Iterations completed before the abort was observed
        iterations: usize,
    },
}

impl SolverError {
    /// Returns `true` if this error reports a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SolverError::Cancelled { .. })
    }
}

impl From<SolverError> for PricingError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::InvalidConfiguration(_) => PricingError::InvalidInput(err.to_string()),
            _ => PricingError::NumericalInstability(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // PricingError Tests
    // ========================================

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::NumericalInstability("annuity is zero".to_string());
        assert_eq!(format!("{}", err), "Numerical instability: annuity is zero");

        let err = PricingError::ModelFailure("negative variance".to_string());
        assert_eq!(format!("{}", err), "Model failure: negative variance");
    }

    #[test]
    fn test_pricing_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&PricingError::InvalidInput("x".to_string()));
    }

    // ========================================
    // SolverError Tests
    // ========================================

    #[test]
    fn test_no_bracket_display() {
        let err = SolverError::NoBracket { a: 1.0, b: 2.0 };
        assert_eq!(format!("{}", err), "No bracket: f(1) and f(2) have same sign");
    }

    #[test]
    fn test_cancelled_display_and_flag() {
        let err = SolverError::Cancelled { iterations: 0 };
        assert!(err.is_cancelled());
        assert!(format!("{}", err).contains("cancellation"));
        assert!(!SolverError::InvalidConfiguration("x".to_string()).is_cancelled());
    }

    #[test]
    fn test_solver_error_into_pricing_error() {
        let pricing: PricingError = SolverError::NoBracket { a: -1.0, b: 1.0 }.into();
        assert!(matches!(pricing, PricingError::NumericalInstability(_)));

        let pricing: PricingError = SolverError::InvalidConfiguration("bad".to_string()).into();
        assert!(matches!(pricing, PricingError::InvalidInput(_)));
    }
}
