//! Numerical methods.
//!
//! - [`solvers`]: Root finding, minimisation strategies and finite differences

pub mod solvers;
