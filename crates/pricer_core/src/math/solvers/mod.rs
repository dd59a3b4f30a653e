//! Root-finding and minimisation solvers.
//!
//! ## Root-Finding
//!
//! - [`BrentSolver`]: bracketing root finder, with an expanding-bracket
//!   variant for roots whose location is only roughly known
//!
//! ## Minimisation
//!
//! Every strategy implements [`Minimizer`] over a [`MinimizationProblem`]:
//!
//! - [`DifferentialEvolution`]: seeded population search inside box bounds
//! - [`Bfgs`]: quasi-Newton refinement with finite-difference gradients
//! - [`LevenbergMarquardtSolver`]: damped Gauss-Newton for residual objectives
//!
//! Long solves observe a [`CancellationToken`] between iterations.
//!
//! ## Examples
//!
//! ### Root-Finding
//!
//! ```
//! use pricer_core::math::solvers::{BrentSolver, SolverConfig};
//!
//! let solver = BrentSolver::new(SolverConfig::default());
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```
//!
//! ### Global Search then Local Refinement
//!
//! ```
//! use pricer_core::math::solvers::{
//!     Bfgs, BfgsSettings, DifferentialEvolution, DifferentialEvolutionSettings,
//!     MinimizationProblem, Minimizer, ParameterBounds,
//! };
//!
//! let objective = |x: &[f64]| (x[0] - 0.3).powi(2) + 10.0 * (x[1] - 0.02).powi(2);
//!
//! let bounded = MinimizationProblem::new(&objective).with_bounds(vec![
//!     ParameterBounds::new(0.0, 1.0),
//!     ParameterBounds::new(0.0, 0.5),
//! ]);
//! let coarse = DifferentialEvolution
//!     .minimize(&bounded, &DifferentialEvolutionSettings::default(), &[0.1, 0.1])
//!     .unwrap();
//!
//! let local = MinimizationProblem::new(&objective);
//! let fine = Bfgs
//!     .minimize(&local, &BfgsSettings::default(), &coarse.params)
//!     .unwrap();
//! assert!((fine.params[0] - 0.3).abs() < 1e-5);
//! assert!((fine.params[1] - 0.02).abs() < 1e-5);
//! ```

mod bfgs;
mod brent;
mod cancellation;
mod config;
mod differential_evolution;
pub mod finite_difference;
mod levenberg_marquardt;
mod problem;

pub use bfgs::{Bfgs, BfgsSettings};
pub use brent::BrentSolver;
pub use cancellation::CancellationToken;
pub use config::SolverConfig;
pub use differential_evolution::{DifferentialEvolution, DifferentialEvolutionSettings};
pub use finite_difference::FiniteDifferenceScheme;
pub use levenberg_marquardt::{LMConfig, LMResult, LevenbergMarquardtSolver};
pub use problem::{MinimizationProblem, Minimizer, Objective, ParameterBounds, Solution};
