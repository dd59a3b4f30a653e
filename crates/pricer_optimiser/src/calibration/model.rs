//! Hull-White model prices on the calibration grid.

use pricer_core::market_data::curves::YieldCurve;
use pricer_models::instruments::rates::SwaptionType;
use pricer_models::models::rates::HullWhiteParams;

use super::instruments::{PriceMatrix, SwaptionGrid};
use super::reference::PRICE_SCALE;
use super::surface::FilteredGrid;
use crate::error::CalibrationError;

/// Position of each parameter in the calibration vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HWParamIndex {
    /// Mean reversion speed (a)
    Alpha = 0,
    /// Short-rate volatility (sigma)
    Sigma = 1,
}

impl HWParamIndex {
    /// Number of calibrated parameters.
    pub const COUNT: usize = 2;

    /// Parameter names as reported in results, in vector order.
    pub const NAMES: [&'static str; 2] = ["Alpha", "Sigma"];

    /// Reported name.
    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

/// Interpret a calibration vector as Hull-White parameters.
pub fn params_from_slice(params: &[f64]) -> Result<HullWhiteParams, CalibrationError> {
    if params.len() != HWParamIndex::COUNT {
        return Err(CalibrationError::InvalidParameters(format!(
            "expected {} values, got {}",
            HWParamIndex::COUNT,
            params.len()
        )));
    }
    HullWhiteParams::new(
        params[HWParamIndex::Alpha as usize],
        params[HWParamIndex::Sigma as usize],
    )
    .map_err(|e| CalibrationError::InvalidParameters(e.to_string()))
}

/// Prices each cell at the money under Hull-White, in the same units as the
/// reference prices.
///
/// Prices are continuous in both parameters, including through zero mean
/// reversion, so finite-difference gradients stay well behaved.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::ZeroCurve;
/// use pricer_optimiser::calibration::{
///     FilterCriteria, ModelPricer, SurfaceFilter, VolatilitySurface,
/// };
///
/// let curve = ZeroCurve::flat(0.02_f64);
/// let surface = VolatilitySurface::new(vec![5.0], vec![5.0], vec![vec![0.2]]).unwrap();
/// let grid = SurfaceFilter::filter(&surface, &FilterCriteria::default());
///
/// let low = ModelPricer::default().price(&[0.1, 0.005], &curve, &grid, 1.0).unwrap();
/// let high = ModelPricer::default().price(&[0.1, 0.010], &curve, &grid, 1.0).unwrap();
/// assert!(high.get(0, 0) > low.get(0, 0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelPricer {
    swaption_type: SwaptionType,
}

impl ModelPricer {
    /// Create a pricer for the given side.
    pub fn new(swaption_type: SwaptionType) -> Self {
        Self { swaption_type }
    }

    /// Price every cell of `grid` for parameter vector `[alpha, sigma]`.
    pub fn price<C>(
        &self,
        params: &[f64],
        curve: &C,
        grid: &FilteredGrid,
        tenor_step: f64,
    ) -> Result<PriceMatrix, CalibrationError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        let swaptions = SwaptionGrid::build(curve, grid, tenor_step)?;
        self.price_swaptions(params, &swaptions)
    }

    /// Price pre-discounted cells for parameter vector `[alpha, sigma]`.
    pub fn price_swaptions(
        &self,
        params: &[f64],
        swaptions: &SwaptionGrid,
    ) -> Result<PriceMatrix, CalibrationError> {
        let hw = params_from_slice(params)?;
        swaptions.map_cells(|i, j, swaption| {
            hw.swaption_price(swaption, swaption.forward(), self.swaption_type)
                .map(|price| PRICE_SCALE * price)
                .map_err(|source| CalibrationError::ModelPricing {
                    maturity: swaptions.maturities()[i],
                    duration: swaptions.durations()[j],
                    source,
                })
        })
    }
}
