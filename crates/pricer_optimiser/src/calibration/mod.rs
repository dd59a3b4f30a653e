//! Hull-White one-factor calibration to a swaption volatility surface.
//!
//! - [`SurfaceFilter`]: Select the calibration cells from a [`VolatilitySurface`]
//! - [`ReferencePricer`]: Market prices from Black-76 or Bachelier
//! - [`ModelPricer`]: Hull-White prices for a candidate `(alpha, sigma)`
//! - [`CalibrationObjective`]: Sum of squared pricing errors
//! - [`CalibrationOrchestrator`]: Global search then local refinement
//! - [`CalibrationResult`]: Named parameters, echoed curve and diagnostics
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Calibration Flow                          │
//! │                                                              │
//! │  VolatilitySurface → FilteredGrid → SwaptionGrid             │
//! │                                       │                      │
//! │                        ┌──────────────┴─────────────┐        │
//! │                        ▼                            ▼        │
//! │                 ReferencePricer               ModelPricer    │
//! │                        │                            │        │
//! │                        └──────► Objective ◄─────────┘        │
//! │                                    │                         │
//! │                      global search → local refinement        │
//! │                                    │                         │
//! │                                    ▼                         │
//! │                           CalibrationResult                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All prices are quoted per 1000 notional ([`PRICE_SCALE`]).

mod config;
mod instruments;
mod model;
mod objective;
mod orchestrator;
mod reference;
mod result;
mod surface;

pub use config::CalibrationConfig;
pub use instruments::{PriceMatrix, SwaptionGrid};
pub use model::{params_from_slice, HWParamIndex, ModelPricer};
pub use objective::{CalibrationObjective, ObjectiveDiagnostics};
pub use orchestrator::CalibrationOrchestrator;
pub use reference::{resolve_tenor_step, ReferencePricer, DEFAULT_TENOR_STEP, PRICE_SCALE};
pub use result::{
    CalibratedParameter, CalibrationDiagnostics, CalibrationResult, CalibrationStatus,
};
pub use surface::{FilterCriteria, FilteredGrid, SurfaceFilter, VolatilitySurface};
