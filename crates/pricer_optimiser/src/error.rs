//! Calibration error types.
//!
//! Every failure the calibration pipeline can meet is a [`CalibrationError`].
//! The orchestrator never lets one escape: it is turned into a failed
//! [`CalibrationResult`](crate::calibration::CalibrationResult) whose message
//! is the error's `Display` text.

use std::fmt;

use pricer_core::types::SolverError;
use pricer_models::analytical::AnalyticalError;
use thiserror::Error;

/// Stage of the two-stage solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStage {
    /// Coarse population-based search.
    GlobalSearch,
    /// Gradient-based refinement.
    LocalRefinement,
}

impl fmt::Display for SolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStage::GlobalSearch => write!(f, "global search"),
            SolveStage::LocalRefinement => write!(f, "local refinement"),
        }
    }
}

/// Failure classes reported to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Malformed inputs or parameters.
    InvalidInput,
    /// The filter bounds removed every instrument.
    EmptyFilterResult,
    /// A price was undefined for the curve or parameters given.
    PricingDomainError,
    /// A solver stage reported an internal failure.
    SolverError,
    /// The host requested an abort.
    Cancellation,
}

/// Errors raised while calibrating.
///
/// # Variants
///
/// - `InvalidSurface`: Volatility matrix shape does not match its axes
/// - `InvalidParameters`: Parameter vector unusable by the model
/// - `EmptyFilterResult`: No cell survived the filter
/// - `ReferencePricing`: Market price undefined at a cell
/// - `ModelPricing`: Model price undefined at a cell
/// - `Solver`: A solve stage failed
/// - `Cancelled`: A solve stage was aborted
///
/// # Examples
///
/// ```
/// use pricer_optimiser::{CalibrationError, ErrorKind};
///
/// let err = CalibrationError::EmptyFilterResult;
/// assert_eq!(err.kind(), ErrorKind::EmptyFilterResult);
/// assert!(err.to_string().contains("relax filters"));
/// ```
#[derive(Error, Debug, Clone)]
pub enum CalibrationError {
    /// Volatility surface shape mismatch.
    #[error("Invalid volatility surface: {0}")]
    InvalidSurface(String),

    /// Parameter vector is not a usable `(alpha, sigma)` pair.
    #[error("Invalid model parameters: {0}")]
    InvalidParameters(String),

    /// The filter criteria excluded every maturity or every duration.
    #[error("No instruments satisfying criteria found, please relax filters")]
    EmptyFilterResult,

    /// Reference price undefined at a grid cell.
    #[error("Reference pricing failed at maturity {maturity}, duration {duration}: {source}")]
    ReferencePricing {
        /// Cell maturity in years
        maturity: f64,
        /// Cell duration in years
        duration: f64,
        /// Underlying formula error
        source: AnalyticalError,
    },

    /// Model price undefined at a grid cell.
    #[error("Model pricing failed at maturity {maturity}, duration {duration}: {source}")]
    ModelPricing {
        /// Cell maturity in years
        maturity: f64,
        /// Cell duration in years
        duration: f64,
        /// Underlying formula error
        source: AnalyticalError,
    },

    /// A solver stage reported a failure; its message is kept verbatim.
    #[error("{stage} failed: {source}")]
    Solver {
        /// Stage that failed
        stage: SolveStage,
        /// Solver error
        source: SolverError,
    },

    /// A solver stage observed a cancellation request.
    #[error("Calibration cancelled during {stage} after {iterations} iterations")]
    Cancelled {
        /// Stage that was running
        stage: SolveStage,
        /// Iterations completed before the abort
        iterations: usize,
    },
}

impl CalibrationError {
    /// Wrap a solver error raised during `stage`.
    ///
    /// Cancellation is split out so hosts can tell it apart from divergence.
    pub fn from_solver(stage: SolveStage, source: SolverError) -> Self {
        match source {
            SolverError::Cancelled { iterations } => Self::Cancelled { stage, iterations },
            source => Self::Solver { stage, source },
        }
    }

    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSurface(_) | Self::InvalidParameters(_) => ErrorKind::InvalidInput,
            Self::EmptyFilterResult => ErrorKind::EmptyFilterResult,
            Self::ReferencePricing { .. } | Self::ModelPricing { .. } => {
                ErrorKind::PricingDomainError
            }
            Self::Solver { .. } => ErrorKind::SolverError,
            Self::Cancelled { .. } => ErrorKind::Cancellation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_message_kept_verbatim() {
        let source = SolverError::NumericalInstability("objective is not finite".to_string());
        let err = CalibrationError::from_solver(SolveStage::LocalRefinement, source.clone());
        assert_eq!(err.kind(), ErrorKind::SolverError);
        assert!(err.to_string().contains(&source.to_string()));
        assert!(err.to_string().starts_with("local refinement failed"));
    }

    #[test]
    fn test_cancellation_is_split_out() {
        let err = CalibrationError::from_solver(
            SolveStage::GlobalSearch,
            SolverError::Cancelled { iterations: 0 },
        );
        assert_eq!(err.kind(), ErrorKind::Cancellation);
        assert!(err.to_string().contains("cancelled during global search"));
    }

    #[test]
    fn test_pricing_errors_are_domain_errors() {
        let err = CalibrationError::ReferencePricing {
            maturity: 5.0,
            duration: 5.0,
            source: AnalyticalError::InvalidAnnuity { annuity: 0.0 },
        };
        assert_eq!(err.kind(), ErrorKind::PricingDomainError);
        assert!(err.to_string().contains("maturity 5"));
        assert!(err.to_string().contains("annuity"));
    }

    #[test]
    fn test_input_errors() {
        assert_eq!(
            CalibrationError::InvalidSurface("2 rows".to_string()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            CalibrationError::InvalidParameters("3 values".to_string()).kind(),
            ErrorKind::InvalidInput
        );
    }
}
