//! Interest rate derivative instruments.
//!
//! - [`SwaptionSchedule`]: fixed-leg payment times of a swaption's underlying
//! - [`DiscountedSwaption`]: schedule bound to a zero curve (annuity, forward)
//! - [`pricing`]: Black-76 and Bachelier swaption formulas

pub mod pricing;
mod swaption;

pub use pricing::{price_swaption, price_swaption_bachelier, price_swaption_black76};
pub use swaption::{
    DiscountedSwaption, SwaptionSchedule, SwaptionType, VolatilityType, MIN_ANNUITY,
};
