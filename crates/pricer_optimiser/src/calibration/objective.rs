//! Sum-of-squares distance between model and reference prices.

use pricer_core::math::solvers::Objective;

use super::instruments::{PriceMatrix, SwaptionGrid};
use super::model::ModelPricer;
use crate::error::CalibrationError;

/// Objective value together with the per-cell errors behind it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectiveDiagnostics {
    /// Sum of squared pricing errors.
    pub value: f64,
    /// Model minus reference price per cell, in scaled units.
    pub errors: PriceMatrix,
    /// Model prices per cell, in scaled units.
    pub model_prices: PriceMatrix,
}

/// Calibration objective over a fixed grid.
///
/// Holds the discounted swaptions and their reference prices; only the
/// parameter vector changes between evaluations. Through the [`Objective`]
/// impl a pricing failure reads as `+∞`, which solvers treat as an
/// infeasible point.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::ZeroCurve;
/// use pricer_optimiser::calibration::{
///     CalibrationObjective, FilterCriteria, ModelPricer, SurfaceFilter, SwaptionGrid,
///     VolatilitySurface,
/// };
///
/// let curve = ZeroCurve::flat(0.02_f64);
/// let surface = VolatilitySurface::new(vec![5.0], vec![5.0], vec![vec![0.2]]).unwrap();
/// let grid = SurfaceFilter::filter(&surface, &FilterCriteria::default());
/// let swaptions = SwaptionGrid::build(&curve, &grid, 1.0).unwrap();
///
/// // Reference prices generated by the model itself
/// let pricer = ModelPricer::default();
/// let reference = pricer.price_swaptions(&[0.05, 0.01], &swaptions).unwrap();
/// let objective = CalibrationObjective::new(swaptions, reference, pricer).unwrap();
///
/// assert!(objective.evaluate(&[0.05, 0.01]).unwrap() < 1e-20);
/// assert!(objective.evaluate(&[0.05, 0.02]).unwrap() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct CalibrationObjective {
    swaptions: SwaptionGrid,
    reference: PriceMatrix,
    pricer: ModelPricer,
}

impl CalibrationObjective {
    /// Bind the grid, its reference prices and the model pricer.
    ///
    /// # Errors
    ///
    /// `InvalidSurface` if `reference` does not have one entry per cell.
    pub fn new(
        swaptions: SwaptionGrid,
        reference: PriceMatrix,
        pricer: ModelPricer,
    ) -> Result<Self, CalibrationError> {
        let rows = swaptions.maturities().len();
        let cols = swaptions.durations().len();
        let shape_matches = reference.rows() == rows
            && reference.values().iter().all(|row| row.len() == cols);
        if !shape_matches {
            return Err(CalibrationError::InvalidSurface(format!(
                "reference prices are {}x{}, grid is {}x{}",
                reference.rows(),
                reference.cols(),
                rows,
                cols
            )));
        }

        Ok(Self {
            swaptions,
            reference,
            pricer,
        })
    }

    /// Discounted swaptions being fitted.
    pub fn swaptions(&self) -> &SwaptionGrid {
        &self.swaptions
    }

    /// Reference prices being fitted.
    pub fn reference_prices(&self) -> &PriceMatrix {
        &self.reference
    }

    /// Sum over cells of `(model - reference)²`.
    pub fn evaluate(&self, params: &[f64]) -> Result<f64, CalibrationError> {
        Ok(self.residual_matrix(params)?.sum_of_squares())
    }

    /// Objective value plus the per-cell error matrix.
    pub fn evaluate_with_diagnostics(
        &self,
        params: &[f64],
    ) -> Result<ObjectiveDiagnostics, CalibrationError> {
        let model_prices = self.pricer.price_swaptions(params, &self.swaptions)?;
        let errors = model_prices.difference(&self.reference);
        Ok(ObjectiveDiagnostics {
            value: errors.sum_of_squares(),
            errors,
            model_prices,
        })
    }

    /// Per-cell pricing errors, row by row.
    pub fn residual_vector(&self, params: &[f64]) -> Result<Vec<f64>, CalibrationError> {
        Ok(self.residual_matrix(params)?.iter().collect())
    }

    fn residual_matrix(&self, params: &[f64]) -> Result<PriceMatrix, CalibrationError> {
        let model_prices = self.pricer.price_swaptions(params, &self.swaptions)?;
        Ok(model_prices.difference(&self.reference))
    }
}

impl Objective for CalibrationObjective {
    fn value(&self, params: &[f64]) -> f64 {
        self.evaluate(params).unwrap_or(f64::INFINITY)
    }

    fn residuals(&self, params: &[f64]) -> Option<Vec<f64>> {
        Some(
            self.residual_vector(params)
                .unwrap_or_else(|_| vec![f64::INFINITY; self.swaptions.len()]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::surface::{FilterCriteria, SurfaceFilter, VolatilitySurface};
    use approx::assert_abs_diff_eq;
    use pricer_core::market_data::curves::ZeroCurve;

    fn objective_at(truth: [f64; 2]) -> CalibrationObjective {
        let curve = ZeroCurve::new(&[1.0, 5.0, 20.0], &[0.015, 0.02, 0.028]).unwrap();
        let surface = VolatilitySurface::new(
            vec![1.0, 2.0, 5.0],
            vec![2.0, 5.0],
            vec![vec![0.2; 2]; 3],
        )
        .unwrap();
        let grid = SurfaceFilter::filter(&surface, &FilterCriteria::default());
        let swaptions = SwaptionGrid::build(&curve, &grid, 0.5).unwrap();
        let pricer = ModelPricer::default();
        let reference = pricer.price_swaptions(&truth, &swaptions).unwrap();
        CalibrationObjective::new(swaptions, reference, pricer).unwrap()
    }

    // ========================================
    // Evaluation Tests
    // ========================================

    #[test]
    fn test_zero_at_true_parameters() {
        let objective = objective_at([0.07, 0.011]);
        assert_abs_diff_eq!(objective.evaluate(&[0.07, 0.011]).unwrap(), 0.0, epsilon = 1e-20);
    }

    #[test]
    fn test_positive_away_from_truth() {
        let objective = objective_at([0.07, 0.011]);
        assert!(objective.evaluate(&[0.07, 0.012]).unwrap() > 0.0);
        assert!(objective.evaluate(&[0.2, 0.011]).unwrap() > 0.0);
    }

    #[test]
    fn test_diagnostics_agree_with_value() {
        let objective = objective_at([0.07, 0.011]);
        let params = [0.03, 0.009];
        let diagnostics = objective.evaluate_with_diagnostics(&params).unwrap();
        assert_eq!(diagnostics.value, objective.evaluate(&params).unwrap());
        assert_eq!((diagnostics.errors.rows(), diagnostics.errors.cols()), (3, 2));

        let cell = diagnostics.model_prices.get(1, 1) - objective.reference_prices().get(1, 1);
        assert_eq!(diagnostics.errors.get(1, 1), cell);
    }

    #[test]
    fn test_residuals_square_to_value() {
        let objective = objective_at([0.07, 0.011]);
        let params = [0.1, 0.013];
        let residuals = objective.residuals(&params).unwrap();
        assert_eq!(residuals.len(), 6);
        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        assert_abs_diff_eq!(sse, objective.value(&params), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_parameters_read_as_infinite() {
        let objective = objective_at([0.07, 0.011]);
        assert!(objective.evaluate(&[f64::NAN, 0.01]).is_err());
        assert_eq!(objective.value(&[f64::NAN, 0.01]), f64::INFINITY);
        assert!(objective.residuals(&[0.1]).unwrap().iter().all(|r| r.is_infinite()));
    }

    #[test]
    fn test_rejects_mismatched_reference() {
        let objective = objective_at([0.07, 0.011]);
        let err = CalibrationObjective::new(
            objective.swaptions().clone(),
            PriceMatrix::new(vec![vec![1.0]]),
            ModelPricer::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidSurface(_)));
    }
}
