//! Market-implied swaption prices.

use pricer_core::market_data::curves::YieldCurve;
use pricer_models::instruments::rates::{price_swaption, SwaptionType, VolatilityType};
use tracing::warn;

use super::instruments::{PriceMatrix, SwaptionGrid};
use super::surface::FilteredGrid;
use crate::error::CalibrationError;

/// Multiplier applied to every price: prices are quoted per 1000 notional.
pub const PRICE_SCALE: f64 = 1000.0;

/// Fixed-leg step used when the request carries none.
pub const DEFAULT_TENOR_STEP: f64 = 1.0;

/// Fixed-leg step to price with, plus a notice if the default was used.
///
/// A missing, zero, negative or non-finite step is treated as unset.
///
/// # Example
///
/// ```
/// use pricer_optimiser::calibration::resolve_tenor_step;
///
/// assert_eq!(resolve_tenor_step(Some(0.5)), (0.5, None));
///
/// let (step, notice) = resolve_tenor_step(Some(0.0));
/// assert_eq!(step, 1.0);
/// assert!(notice.is_some());
/// ```
pub fn resolve_tenor_step(requested: Option<f64>) -> (f64, Option<String>) {
    match requested {
        Some(step) if step.is_finite() && step > 0.0 => (step, None),
        other => {
            let notice = match other {
                Some(step) => format!(
                    "Tenor step {} is not usable, defaulting to {} year",
                    step, DEFAULT_TENOR_STEP
                ),
                None => format!("Tenor step not set, defaulting to {} year", DEFAULT_TENOR_STEP),
            };
            warn!("{}", notice);
            (DEFAULT_TENOR_STEP, Some(notice))
        }
    }
}

/// Prices each filtered cell at the money with the market formula.
///
/// The volatility convention picks Black-76 or Bachelier. Strikes are the
/// forward swap rate, so payer and receiver prices coincide.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::ZeroCurve;
/// use pricer_optimiser::calibration::{
///     FilterCriteria, ReferencePricer, SurfaceFilter, VolatilitySurface,
/// };
///
/// let curve = ZeroCurve::flat(0.02_f64);
/// let surface = VolatilitySurface::new(vec![5.0], vec![5.0], vec![vec![0.2]]).unwrap();
/// let grid = SurfaceFilter::filter(&surface, &FilterCriteria::default());
///
/// let prices = ReferencePricer::default().price(&curve, &grid, 1.0).unwrap();
/// assert!(prices.get(0, 0) > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferencePricer {
    volatility_type: VolatilityType,
    swaption_type: SwaptionType,
}

impl ReferencePricer {
    /// Create a pricer for the given quote convention and side.
    pub fn new(volatility_type: VolatilityType, swaption_type: SwaptionType) -> Self {
        Self {
            volatility_type,
            swaption_type,
        }
    }

    /// Volatility convention of the quotes.
    pub fn volatility_type(&self) -> VolatilityType {
        self.volatility_type
    }

    /// Price every cell of `grid` on `curve`, paying fixed every `tenor_step` years.
    pub fn price<C>(
        &self,
        curve: &C,
        grid: &FilteredGrid,
        tenor_step: f64,
    ) -> Result<PriceMatrix, CalibrationError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        let swaptions = SwaptionGrid::build(curve, grid, tenor_step)?;
        self.price_swaptions(&swaptions, grid)
    }

    /// Price pre-discounted cells using the volatilities in `grid`.
    ///
    /// `grid` must be the grid `swaptions` was built from.
    pub fn price_swaptions(
        &self,
        swaptions: &SwaptionGrid,
        grid: &FilteredGrid,
    ) -> Result<PriceMatrix, CalibrationError> {
        swaptions.map_cells(|i, j, swaption| {
            price_swaption(
                swaption,
                swaption.forward(),
                grid.volatility(i, j),
                self.volatility_type,
                self.swaption_type,
            )
            .map(|price| PRICE_SCALE * price)
            .map_err(|source| CalibrationError::ReferencePricing {
                maturity: swaptions.maturities()[i],
                duration: swaptions.durations()[j],
                source,
            })
        })
    }
}
