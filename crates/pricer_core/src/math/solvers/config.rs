//! Root-finder configuration.

use num_traits::Float;

/// Configuration for root-finding algorithms.
///
/// # Type Parameters
///
/// * `T` - Floating-point type for tolerance (e.g., `f64`)
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
/// assert_eq!(config.max_bracket_expansions, 60);
///
/// let custom = SolverConfig::new(1e-14, 200);
/// assert_eq!(custom.max_iterations, 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig<T: Float> {
    /// Convergence tolerance. The solver stops when `|f(x)| < tolerance`
    /// or the bracket half-width drops below it.
    pub tolerance: T,

    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,

    /// Maximum number of geometric widenings when searching for a bracket.
    pub max_bracket_expansions: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Default values:
    /// - `tolerance`: 1e-12
    /// - `max_iterations`: 100
    /// - `max_bracket_expansions`: 60
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-12).unwrap_or_else(T::epsilon),
            max_iterations: 100,
            max_bracket_expansions: 60,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a new configuration with specified tolerance and iteration limit.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance <= 0` or `max_iterations == 0`.
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        assert!(tolerance > T::zero(), "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    /// Override the bracket expansion budget.
    pub fn with_max_bracket_expansions(mut self, expansions: usize) -> Self {
        self.max_bracket_expansions = expansions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config: SolverConfig<f64> = SolverConfig::default();
        assert!((config.tolerance - 1e-12).abs() < 1e-20);
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.max_bracket_expansions, 60);
    }

    #[test]
    fn test_with_max_bracket_expansions() {
        let config: SolverConfig<f64> = SolverConfig::new(1e-8, 10).with_max_bracket_expansions(5);
        assert_eq!(config.max_bracket_expansions, 5);
        assert_eq!(config.max_iterations, 10);
    }

    #[test]
    #[should_panic(expected = "tolerance must be positive")]
    fn test_new_rejects_zero_tolerance() {
        let _ = SolverConfig::new(0.0_f64, 10);
    }
}
