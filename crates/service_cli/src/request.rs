//! Calibration request file.
//!
//! A request is a JSON document:
//!
//! ```json
//! {
//!   "curve": { "dates": [1.0, 5.0, 10.0], "rates": [0.018, 0.02, 0.023] },
//!   "surface": {
//!     "maturities": [1.0, 5.0],
//!     "durations": [5.0, 10.0],
//!     "volatilities": [[0.25, 0.23], [0.21, 0.20]]
//!   },
//!   "filter": { "min_maturity": 1.0, "max_maturity": 10.0 },
//!   "tenor_step": 1.0
//! }
//! ```
//!
//! The curve may instead be given as calendar-dated pillars with a
//! `valuation_date`. The surface may instead be embedded in a `market`
//! block as `swaption_maturities`, `swaption_durations` and
//! `swaption_volatilities`; a `surface` block always wins.

use chrono::NaiveDate;
use pricer_core::market_data::curves::ZeroCurve;
use pricer_optimiser::calibration::{FilterCriteria, VolatilitySurface};
use serde::Deserialize;
use tracing::debug;

use crate::{CliError, Result};

/// Zero curve as written in a request.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CurveInput {
    /// Pillar times in years
    Times {
        /// Pillar times
        dates: Vec<f64>,
        /// Zero rates
        rates: Vec<f64>,
    },
    /// Calendar-dated pillars, converted with ACT/365F
    Dated {
        /// Date the pillars are measured from
        valuation_date: NaiveDate,
        /// Pillars in date order
        pillars: Vec<DatedPillar>,
    },
}

/// One calendar-dated zero rate.
#[derive(Debug, Clone, Deserialize)]
pub struct DatedPillar {
    /// Pillar date
    pub date: NaiveDate,
    /// Continuously compounded zero rate
    pub rate: f64,
}

/// Dedicated volatility matrix.
#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceInput {
    /// Option maturities (rows)
    pub maturities: Vec<f64>,
    /// Swap durations (columns)
    pub durations: Vec<f64>,
    /// One row per maturity
    pub volatilities: Vec<Vec<f64>>,
}

/// Market data block that may carry the surface inline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MarketInput {
    /// Option maturities (rows)
    pub swaption_maturities: Option<Vec<f64>>,
    /// Swap durations (columns)
    pub swaption_durations: Option<Vec<f64>>,
    /// One row per maturity
    pub swaption_volatilities: Option<Vec<Vec<f64>>>,
}

impl MarketInput {
    fn surface(&self) -> Option<SurfaceInput> {
        match (
            &self.swaption_maturities,
            &self.swaption_durations,
            &self.swaption_volatilities,
        ) {
            (Some(maturities), Some(durations), Some(volatilities)) => Some(SurfaceInput {
                maturities: maturities.clone(),
                durations: durations.clone(),
                volatilities: volatilities.clone(),
            }),
            _ => None,
        }
    }
}

/// Parsed request file.
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationRequest {
    /// Discount curve
    pub curve: CurveInput,
    /// Dedicated volatility matrix
    #[serde(default)]
    pub surface: Option<SurfaceInput>,
    /// Market block with inline surface fields
    #[serde(default)]
    pub market: Option<MarketInput>,
    /// Filter bounds; the widest range when absent
    #[serde(default)]
    pub filter: Option<FilterCriteria>,
    /// Fixed-leg step in years
    #[serde(default)]
    pub tenor_step: Option<f64>,
}

impl CalibrationRequest {
    /// Parse a request from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a request file.
    pub fn from_path(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            return Err(CliError::FileNotFound(path.to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Build the zero curve.
    pub fn zero_curve(&self) -> Result<ZeroCurve<f64>> {
        let curve = match &self.curve {
            CurveInput::Times { dates, rates } => ZeroCurve::new(dates, rates),
            CurveInput::Dated {
                valuation_date,
                pillars,
            } => {
                let pillars: Vec<(NaiveDate, f64)> =
                    pillars.iter().map(|p| (p.date, p.rate)).collect();
                ZeroCurve::from_dated_pillars(*valuation_date, &pillars)
            }
        };
        curve.map_err(|e| CliError::InvalidRequest(format!("curve: {}", e)))
    }

    /// Build the volatility surface, preferring the dedicated block.
    pub fn volatility_surface(&self) -> Result<VolatilitySurface> {
        let input = match (&self.surface, self.market.as_ref().and_then(MarketInput::surface)) {
            (Some(surface), _) => {
                debug!("Using dedicated surface block");
                surface.clone()
            }
            (None, Some(embedded)) => {
                debug!("Using surface embedded in market block");
                embedded
            }
            (None, None) => {
                return Err(CliError::InvalidRequest(
                    "no volatility surface: supply a `surface` block or market swaption fields"
                        .to_string(),
                ))
            }
        };

        VolatilitySurface::new(input.maturities, input.durations, input.volatilities)
            .map_err(|e| CliError::InvalidRequest(e.to_string()))
    }

    /// Filter bounds, defaulting to the widest range.
    pub fn filter_criteria(&self) -> FilterCriteria {
        self.filter.unwrap_or_default()
    }
}
