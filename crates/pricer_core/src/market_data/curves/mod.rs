//! Curve abstractions for discounting.
//!
//! This module provides:
//! - [`YieldCurve`]: Generic trait for discount factor and rate calculations
//! - [`ZeroCurve`]: Pillar-based zero-rate curve with linear interpolation

mod traits;
mod zero;

pub use traits::YieldCurve;
pub use zero::ZeroCurve;
