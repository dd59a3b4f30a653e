//! # pricer_optimiser
//!
//! Hull-White one-factor calibration to swaption volatility surfaces.
//!
//! This crate sits between Models (L2) and the service layer, solving the
//! inverse problem that turns market quotes into model parameters.
//!
//! ## Architecture Position
//!
//! Layer 2.5 in the **P**ricer layer of the A-I-P-S architecture.
//! Depends on `pricer_core` (L1) for curves and solvers and on
//! `pricer_models` (L2) for the swaption formulas.
//!
//! ## Modules
//!
//! - `calibration`: Surface filtering, reference and model pricing, the
//!   objective and the two-stage orchestrator
//! - `error`: `CalibrationError` and its failure classes
//!
//! ## Example
//!
//! ```rust
//! use pricer_core::market_data::curves::ZeroCurve;
//! use pricer_core::math::solvers::CancellationToken;
//! use pricer_optimiser::prelude::*;
//!
//! let curve = ZeroCurve::<f64>::new(&[1.0, 5.0, 10.0], &[0.018, 0.02, 0.023]).unwrap();
//! let surface = VolatilitySurface::new(
//!     vec![2.0, 5.0],
//!     vec![5.0],
//!     vec![vec![0.25], vec![0.22]],
//! )
//! .unwrap();
//!
//! let result = CalibrationOrchestrator::new().calibrate(
//!     &curve,
//!     &surface,
//!     &FilterCriteria::default(),
//!     Some(1.0),
//!     &CancellationToken::new(),
//! );
//!
//! assert!(result.is_success());
//! assert_eq!(result.parameters[0].name, "Alpha");
//! assert_eq!(result.curve_dates, vec![1.0, 5.0, 10.0]);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): Price grid cells on the rayon thread pool
//! - `serde`: Serialisation for surfaces, settings and results

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;

mod error;

pub use error::{CalibrationError, ErrorKind, SolveStage};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calibration::*;
    pub use crate::{CalibrationError, ErrorKind, SolveStage};
}
