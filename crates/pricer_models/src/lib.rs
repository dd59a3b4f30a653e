//! # Pricer Models (L2: Business Logic)
//!
//! Swaption instruments and the closed-form formulas used to price them.
//!
//! This crate provides:
//! - Swaption schedules and their discounting against a zero curve
//! - Black-76 (log-normal) and Bachelier (normal) swaption formulas
//! - The Hull-White one-factor model with analytic zero-bond options and
//!   Jamshidian swaption pricing
//!
//! ## Example
//!
//! ```
//! use pricer_core::market_data::curves::ZeroCurve;
//! use pricer_models::instruments::rates::{DiscountedSwaption, SwaptionSchedule, SwaptionType};
//! use pricer_models::models::rates::HullWhiteParams;
//!
//! let curve = ZeroCurve::flat(0.02);
//! let schedule = SwaptionSchedule::new(5.0, 5.0, 1.0).unwrap();
//! let swaption = DiscountedSwaption::new(&curve, &schedule).unwrap();
//!
//! let params = HullWhiteParams::new(0.1, 0.01).unwrap();
//! let price = params
//!     .swaption_price(&swaption, swaption.forward(), SwaptionType::Payer)
//!     .unwrap();
//! assert!(price > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod instruments;
pub mod models;
