//! Calibration result types.
//!
//! A [`CalibrationResult`] is returned for every call, successful or not.
//! On success it carries the named parameters, the echoed zero curve and
//! [`CalibrationDiagnostics`]; on failure only a message and its class.

use super::instruments::PriceMatrix;
use super::model::HWParamIndex;
use crate::error::{CalibrationError, ErrorKind};

/// Outcome flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalibrationStatus {
    /// Both stages completed.
    Success,
    /// The pipeline stopped; see the message.
    Failure,
}

/// A named calibrated value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibratedParameter {
    /// `"Alpha"` or `"Sigma"`
    pub name: String,
    /// Calibrated value
    pub value: f64,
}

/// Details of a successful solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationDiagnostics {
    /// Final sum of squared pricing errors
    pub objective_value: f64,
    /// Root mean squared pricing error
    pub rmse: f64,
    /// Largest absolute pricing error
    pub max_error: f64,
    /// Model minus reference price per cell
    pub pricing_errors: PriceMatrix,
    /// Reference prices per cell
    pub reference_prices: PriceMatrix,
    /// Calibrated maturities (rows)
    pub maturities: Vec<f64>,
    /// Calibrated durations (columns)
    pub durations: Vec<f64>,
    /// Fixed-leg step used, in years
    pub tenor_step: f64,
    /// Generations run by the global stage
    pub global_iterations: usize,
    /// Iterations run by the local stage
    pub local_iterations: usize,
    /// Objective evaluations across both stages
    pub evaluations: usize,
    /// Whether the local stage met its own tolerance
    pub local_converged: bool,
}

impl CalibrationDiagnostics {
    /// Check the fit against an RMSE tolerance.
    pub fn is_quality_acceptable(&self, tolerance: f64) -> bool {
        self.rmse <= tolerance
    }
}

/// Result of a calibration call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationResult {
    /// Outcome flag
    pub status: CalibrationStatus,
    /// Calibrated parameters; empty on failure
    pub parameters: Vec<CalibratedParameter>,
    /// Zero curve pillar times in years, echoed on success.
    ///
    /// A curve built from calendar dates echoes its ACT/365F year
    /// fractions; the dates themselves are not kept.
    pub curve_dates: Vec<f64>,
    /// Zero curve rates, echoed on success
    pub curve_rates: Vec<f64>,
    /// Failure description
    pub message: Option<String>,
    /// Failure class
    pub error_kind: Option<ErrorKind>,
    /// Non-fatal notices raised during the run
    pub warnings: Vec<String>,
    /// Fit details on success
    pub diagnostics: Option<CalibrationDiagnostics>,
}

impl CalibrationResult {
    /// Successful result for `params` in `[alpha, sigma]` order.
    pub fn success(
        params: &[f64],
        curve_dates: Vec<f64>,
        curve_rates: Vec<f64>,
        diagnostics: CalibrationDiagnostics,
        warnings: Vec<String>,
    ) -> Self {
        let parameters = HWParamIndex::NAMES
            .iter()
            .zip(params)
            .map(|(name, &value)| CalibratedParameter {
                name: (*name).to_string(),
                value,
            })
            .collect();

        Self {
            status: CalibrationStatus::Success,
            parameters,
            curve_dates,
            curve_rates,
            message: None,
            error_kind: None,
            warnings,
            diagnostics: Some(diagnostics),
        }
    }

    /// Failed result describing `error`.
    pub fn failure(error: &CalibrationError, warnings: Vec<String>) -> Self {
        Self {
            status: CalibrationStatus::Failure,
            parameters: Vec::new(),
            curve_dates: Vec::new(),
            curve_rates: Vec::new(),
            message: Some(error.to_string()),
            error_kind: Some(error.kind()),
            warnings,
            diagnostics: None,
        }
    }

    /// Whether calibration succeeded.
    pub fn is_success(&self) -> bool {
        self.status == CalibrationStatus::Success
    }

    /// Value of the parameter called `name`.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }

    /// Calibrated mean reversion.
    pub fn alpha(&self) -> Option<f64> {
        self.parameter(HWParamIndex::Alpha.name())
    }

    /// Calibrated volatility.
    pub fn sigma(&self) -> Option<f64> {
        self.parameter(HWParamIndex::Sigma.name())
    }

    /// Final objective value on success.
    pub fn objective_value(&self) -> Option<f64> {
        self.diagnostics.as_ref().map(|d| d.objective_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostics() -> CalibrationDiagnostics {
        CalibrationDiagnostics {
            objective_value: 4e-6,
            rmse: 1e-3,
            max_error: 2e-3,
            pricing_errors: PriceMatrix::new(vec![vec![2e-3]]),
            reference_prices: PriceMatrix::new(vec![vec![12.0]]),
            maturities: vec![5.0],
            durations: vec![5.0],
            tenor_step: 1.0,
            global_iterations: 5,
            local_iterations: 12,
            evaluations: 300,
            local_converged: true,
        }
    }

    #[test]
    fn test_success_names_parameters() {
        let result = CalibrationResult::success(
            &[0.05, 0.01],
            vec![0.0, 10.0],
            vec![0.02, 0.03],
            diagnostics(),
            vec![],
        );
        assert!(result.is_success());
        assert_eq!(result.parameters[0].name, "Alpha");
        assert_eq!(result.alpha(), Some(0.05));
        assert_eq!(result.sigma(), Some(0.01));
        assert_eq!(result.curve_rates, vec![0.02, 0.03]);
        assert_eq!(result.objective_value(), Some(4e-6));
        assert!(result.diagnostics.unwrap().is_quality_acceptable(1e-2));
    }

    #[test]
    fn test_failure_has_no_parameters() {
        let result = CalibrationResult::failure(
            &CalibrationError::EmptyFilterResult,
            vec!["Tenor step not set".to_string()],
        );
        assert!(!result.is_success());
        assert!(result.parameters.is_empty());
        assert!(result.curve_dates.is_empty());
        assert_eq!(result.error_kind, Some(ErrorKind::EmptyFilterResult));
        assert!(!result.message.unwrap().is_empty());
        assert_eq!(result.warnings.len(), 1);
    }
}
