//! # pricer_core: Numerical Foundation for Swaption Calibration
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the calibration stack, providing:
//! - Error types: `SolverError`, `PricingError` (`types::error`)
//! - Zero-coupon curves and the `YieldCurve` trait (`market_data::curves`)
//! - Root finding with Brent's method (`math::solvers`)
//! - The `Minimizer` capability with differential evolution, BFGS and
//!   Levenberg-Marquardt strategies (`math::solvers`)
//! - Finite-difference derivatives (`math::solvers::finite_difference`)
//! - Cooperative cancellation for long-running solves (`math::solvers::CancellationToken`)
//!
//! ## Minimal Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates:
//! - num-traits: Traits for generic numerical computation
//! - chrono: Calendar dates for dated curve pillars
//! - rand: Seeded random streams for the global optimiser
//! - tracing: Iteration diagnostics (no subscriber is installed here)
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::market_data::curves::{YieldCurve, ZeroCurve};
//! use pricer_core::math::solvers::{BrentSolver, SolverConfig};
//!
//! let curve = ZeroCurve::<f64>::new(&[1.0, 5.0, 10.0], &[0.02, 0.025, 0.03]).unwrap();
//! let df = curve.discount_factor(5.0).unwrap();
//! assert!((df - (-0.025_f64 * 5.0).exp()).abs() < 1e-12);
//!
//! let solver = BrentSolver::new(SolverConfig::default());
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for curves, solver settings and errors

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
