//! Interest rate models.
//!
//! ## Hull-White 1F
//!
//! The Hull-White model describes short rate dynamics with mean reversion:
//! ```text
//! dr(t) = [theta(t) - a * r(t)] * dt + sigma * dW(t)
//! ```
//! `theta` is fitted to the initial zero curve, so zero-coupon bonds reprice
//! exactly and only `a` and `sigma` are free.

pub mod hull_white;

pub use hull_white::{BondOptionType, HullWhiteParams};
