//! Calibration settings shared by both solve stages.

use pricer_core::math::solvers::ParameterBounds;
use pricer_models::instruments::rates::{SwaptionType, VolatilityType};

use super::model::HWParamIndex;
use crate::error::CalibrationError;

/// Settings for one calibration run.
///
/// `bounds` constrain both solve stages. Their lower ends must be
/// non-negative, so a published alpha or sigma is never negative.
///
/// # Example
///
/// ```
/// use pricer_optimiser::calibration::CalibrationConfig;
///
/// let config = CalibrationConfig::default();
/// assert_eq!(config.initial_guess, [0.1, 0.1]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationConfig {
    /// Starting `[alpha, sigma]`.
    pub initial_guess: [f64; 2],
    /// Search box for `[alpha, sigma]`.
    pub bounds: [ParameterBounds; 2],
    /// Convention of the quoted volatilities.
    pub volatility_type: VolatilityType,
    /// Side of the calibration swaptions.
    pub swaption_type: SwaptionType,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            initial_guess: [0.1, 0.1],
            bounds: [
                ParameterBounds::new(1e-4, 1.0),
                ParameterBounds::new(1e-6, 0.5),
            ],
            volatility_type: VolatilityType::LogNormal,
            swaption_type: SwaptionType::Payer,
        }
    }
}

impl CalibrationConfig {
    /// Set the volatility convention.
    pub fn with_volatility_type(mut self, volatility_type: VolatilityType) -> Self {
        self.volatility_type = volatility_type;
        self
    }

    /// Set the swaption side.
    pub fn with_swaption_type(mut self, swaption_type: SwaptionType) -> Self {
        self.swaption_type = swaption_type;
        self
    }

    /// Check the initial guess is finite and the bounds are finite, ordered
    /// and non-negative.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.initial_guess.iter().any(|x| !x.is_finite()) {
            return Err(CalibrationError::InvalidParameters(format!(
                "initial guess {:?} is not finite",
                self.initial_guess
            )));
        }
        if let Some(b) = self.bounds.iter().find(|b| !b.is_finite()) {
            return Err(CalibrationError::InvalidParameters(format!(
                "bounds [{}, {}] must be finite with min <= max",
                b.min, b.max
            )));
        }
        if let Some((i, b)) = self.bounds.iter().enumerate().find(|(_, b)| b.min < 0.0) {
            return Err(CalibrationError::InvalidParameters(format!(
                "{} lower bound {} is negative",
                HWParamIndex::NAMES[i],
                b.min
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let config = CalibrationConfig::default();
        assert_eq!(config.bounds[0], ParameterBounds::new(1e-4, 1.0));
        assert_eq!(config.bounds[1], ParameterBounds::new(1e-6, 0.5));
        assert_eq!(config.volatility_type, VolatilityType::LogNormal);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = CalibrationConfig::default();
        config.initial_guess[1] = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = CalibrationConfig::default();
        config.bounds[0] = ParameterBounds::new(1.0, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_lower_bounds() {
        let mut config = CalibrationConfig::default();
        config.bounds[0] = ParameterBounds::new(-0.5, 1.0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Alpha lower bound"));

        let mut config = CalibrationConfig::default();
        config.bounds[1] = ParameterBounds::new(-0.01, 0.5);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Sigma lower bound"));

        let mut config = CalibrationConfig::default();
        config.bounds[0] = ParameterBounds::new(0.0, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = CalibrationConfig::default()
            .with_volatility_type(VolatilityType::Normal)
            .with_swaption_type(SwaptionType::Receiver);
        assert_eq!(config.volatility_type, VolatilityType::Normal);
        assert_eq!(config.swaption_type, SwaptionType::Receiver);
    }
}
