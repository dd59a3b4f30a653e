//! Market data structures for swaption calibration.
//!
//! # Architecture
//!
//! Curves are generic over `T: Float` so the same lookups serve `f64` and
//! `f32` callers alike.
//!
//! # Components
//!
//! - [`curves`]: Yield curve trait and the pillar-based ZeroCurve
//! - [`error`]: Market data error types (MarketDataError)
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::curves::{YieldCurve, ZeroCurve};
//!
//! // Single-pillar curve: flat 5%
//! let curve = ZeroCurve::flat(0.05_f64);
//! let df = curve.discount_factor(1.0).unwrap();
//! assert!((df - 0.951229).abs() < 1e-5);
//! ```

pub mod curves;
pub mod error;

// Re-export commonly used types
pub use curves::{YieldCurve, ZeroCurve};
pub use error::MarketDataError;
