//! Closed-form building blocks shared by the swaption pricers.
//!
//! - Standard normal distribution functions
//! - [`AnalyticalError`] for invalid formula inputs

pub mod distributions;
pub mod error;

pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
