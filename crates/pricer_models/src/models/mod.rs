//! Short-rate models with closed-form option prices.

pub mod rates;
