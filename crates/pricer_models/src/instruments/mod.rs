//! Financial instrument definitions.
//!
//! Instruments are organised by asset class. Only [`rates`] is provided.

pub mod rates;
