//! Differential evolution global search.
//!
//! Classic rand/1/bin scheme: for each member `x_i` a mutant
//! `v = x_a + F (x_b - x_c)` is built from three distinct other members,
//! crossed with `x_i` coordinate-wise with probability `CR`, clamped to the
//! bounds, and kept if it does not worsen the objective.
//!
//! The search is seeded, so repeated runs over the same problem return the
//! same solution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{MinimizationProblem, Minimizer, Solution};
use crate::types::SolverError;

/// Settings for [`DifferentialEvolution`].
///
/// The defaults give a deliberately coarse search (20 members, 5
/// generations) meant to seed a local refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DifferentialEvolutionSettings {
    /// Number of population members (at least 4).
    pub population_size: usize,
    /// Number of generations after the initial population.
    pub max_generations: usize,
    /// Differential weight `F`.
    pub mutation_factor: f64,
    /// Crossover probability `CR`.
    pub crossover_probability: f64,
    /// Seed for the random stream.
    pub seed: u64,
}

impl Default for DifferentialEvolutionSettings {
    fn default() -> Self {
        Self {
            population_size: 20,
            max_generations: 5,
            mutation_factor: 0.8,
            crossover_probability: 0.9,
            seed: 7,
        }
    }
}

impl DifferentialEvolutionSettings {
    fn validate(&self) -> Result<(), SolverError> {
        if self.population_size < 4 {
            return Err(SolverError::InvalidConfiguration(format!(
                "population size must be at least 4, got {}",
                self.population_size
            )));
        }
        if !(self.mutation_factor > 0.0 && self.mutation_factor <= 2.0) {
            return Err(SolverError::InvalidConfiguration(format!(
                "mutation factor must lie in (0, 2], got {}",
                self.mutation_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(SolverError::InvalidConfiguration(format!(
                "crossover probability must lie in [0, 1], got {}",
                self.crossover_probability
            )));
        }
        Ok(())
    }
}

/// Bounded differential evolution minimiser.
///
/// Requires finite bounds on every parameter. The initial guess (projected
/// into the bounds) is always a population member, so the result is never
/// worse than the starting point.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{
///     DifferentialEvolution, DifferentialEvolutionSettings, MinimizationProblem, Minimizer,
///     ParameterBounds,
/// };
///
/// let objective = |x: &[f64]| (x[0] - 0.2).powi(2) + (x[1] + 0.3).powi(2);
/// let problem = MinimizationProblem::new(&objective).with_bounds(vec![
///     ParameterBounds::new(-1.0, 1.0),
///     ParameterBounds::new(-1.0, 1.0),
/// ]);
/// let settings = DifferentialEvolutionSettings {
///     population_size: 30,
///     max_generations: 100,
///     ..Default::default()
/// };
///
/// let solution = DifferentialEvolution
///     .minimize(&problem, &settings, &[0.9, 0.9])
///     .unwrap();
/// assert!((solution.params[0] - 0.2).abs() < 1e-3);
/// assert!((solution.params[1] + 0.3).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferentialEvolution;

impl Minimizer for DifferentialEvolution {
    type Settings = DifferentialEvolutionSettings;

    fn name(&self) -> &'static str {
        "differential evolution"
    }

    fn minimize(
        &self,
        problem: &MinimizationProblem<'_>,
        settings: &Self::Settings,
        initial_guess: &[f64],
    ) -> Result<Solution, SolverError> {
        settings.validate()?;
        let dim = initial_guess.len();
        problem.validate_dimension(dim)?;

        let bounds = problem.bounds().ok_or_else(|| {
            SolverError::InvalidConfiguration("differential evolution requires bounds".to_string())
        })?;
        if let Some(b) = bounds.iter().find(|b| !b.is_finite()) {
            return Err(SolverError::InvalidConfiguration(format!(
                "differential evolution requires finite bounds, got [{}, {}]",
                b.min, b.max
            )));
        }

        problem.check_cancelled(0)?;

        let pop_size = settings.population_size;
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let mut population: Vec<Vec<f64>> = Vec::with_capacity(pop_size);

        let mut seed_member = initial_guess.to_vec();
        problem.project(&mut seed_member);
        population.push(seed_member);
        while population.len() < pop_size {
            let member = bounds
                .iter()
                .map(|b| b.min + rng.gen::<f64>() * b.width())
                .collect();
            population.push(member);
        }

        let mut values: Vec<f64> = population.iter().map(|x| problem.value(x)).collect();
        let mut evaluations = pop_size;

        let mut best_idx = argmin(&values);
        if !values[best_idx].is_finite() {
            return Err(SolverError::NumericalInstability(
                "objective is not finite anywhere in the initial population".to_string(),
            ));
        }

        let mut generation = 0;
        while generation < settings.max_generations {
            problem.check_cancelled(generation)?;

            for i in 0..pop_size {
                let (a, b, c) = pick_three(&mut rng, pop_size, i);
                let j_rand = rng.gen_range(0..dim);

                let mut trial = population[i].clone();
                for d in 0..dim {
                    if d == j_rand || rng.gen::<f64>() < settings.crossover_probability {
                        trial[d] = population[a][d]
                            + settings.mutation_factor * (population[b][d] - population[c][d]);
                    }
                }
                problem.project(&mut trial);

                let trial_value = problem.value(&trial);
                evaluations += 1;
                if trial_value <= values[i] {
                    population[i] = trial;
                    values[i] = trial_value;
                    if trial_value < values[best_idx] {
                        best_idx = i;
                    }
                }
            }

            generation += 1;
            debug!(
                generation,
                best = values[best_idx],
                "differential evolution generation complete"
            );
        }

        Ok(Solution {
            params: population.swap_remove(best_idx),
            value: values[best_idx],
            iterations: generation,
            evaluations,
            converged: true,
        })
    }
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(idx, _)| idx)
}

/// Three distinct indices in `0..n`, all different from `exclude`.
fn pick_three(rng: &mut StdRng, n: usize, exclude: usize) -> (usize, usize, usize) {
    let mut draw = |taken: &[usize]| loop {
        let k = rng.gen_range(0..n);
        if k != exclude && !taken.contains(&k) {
            return k;
        }
    };
    let a = draw(&[]);
    let b = draw(&[a]);
    let c = draw(&[a, b]);
    (a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::solvers::{CancellationToken, ParameterBounds};

    fn unit_box(dim: usize) -> Vec<ParameterBounds> {
        vec![ParameterBounds::new(-2.0, 2.0); dim]
    }

    // ========================================
    // Convergence Tests
    // ========================================

    #[test]
    fn test_finds_quadratic_minimum() {
        let f = |x: &[f64]| (x[0] - 0.5).powi(2) + (x[1] + 1.0).powi(2);
        let problem = MinimizationProblem::new(&f).with_bounds(unit_box(2));
        let settings = DifferentialEvolutionSettings {
            population_size: 30,
            max_generations: 150,
            ..Default::default()
        };
        let sol = DifferentialEvolution.minimize(&problem, &settings, &[0.0, 0.0]).unwrap();
        assert!((sol.params[0] - 0.5).abs() < 1e-4);
        assert!((sol.params[1] + 1.0).abs() < 1e-4);
        assert_eq!(sol.iterations, 150);
        assert_eq!(sol.evaluations, 30 + 150 * 30);
    }

    #[test]
    fn test_never_worse_than_initial_guess() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2);
        let problem = MinimizationProblem::new(&f).with_bounds(unit_box(1));
        let settings = DifferentialEvolutionSettings {
            max_generations: 0,
            ..Default::default()
        };
        let sol = DifferentialEvolution.minimize(&problem, &settings, &[1.0]).unwrap();
        assert_eq!(sol.value, 0.0);
        assert_eq!(sol.params, vec![1.0]);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let f = |x: &[f64]| x[0].sin() + x[1].cos();
        let problem = MinimizationProblem::new(&f).with_bounds(unit_box(2));
        let settings = DifferentialEvolutionSettings::default();
        let a = DifferentialEvolution.minimize(&problem, &settings, &[0.1, 0.1]).unwrap();
        let b = DifferentialEvolution.minimize(&problem, &settings, &[0.1, 0.1]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_initial_guess_outside_bounds_is_projected() {
        let f = |x: &[f64]| x[0];
        let problem = MinimizationProblem::new(&f).with_bounds(unit_box(1));
        let sol = DifferentialEvolution
            .minimize(&problem, &DifferentialEvolutionSettings::default(), &[10.0])
            .unwrap();
        assert!(sol.params[0] >= -2.0 && sol.params[0] <= 2.0);
    }

    // ========================================
    // Error Handling Tests
    // ========================================

    #[test]
    fn test_requires_bounds() {
        let f = |x: &[f64]| x[0];
        let problem = MinimizationProblem::new(&f);
        let err = DifferentialEvolution
            .minimize(&problem, &DifferentialEvolutionSettings::default(), &[0.0])
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rejects_infinite_bounds() {
        let f = |x: &[f64]| x[0];
        let problem = MinimizationProblem::new(&f).with_bounds(vec![ParameterBounds::unbounded()]);
        assert!(DifferentialEvolution
            .minimize(&problem, &DifferentialEvolutionSettings::default(), &[0.0])
            .is_err());
    }

    #[test]
    fn test_rejects_tiny_population() {
        let f = |x: &[f64]| x[0];
        let problem = MinimizationProblem::new(&f).with_bounds(unit_box(1));
        let settings = DifferentialEvolutionSettings {
            population_size: 3,
            ..Default::default()
        };
        assert!(matches!(
            DifferentialEvolution.minimize(&problem, &settings, &[0.0]),
            Err(SolverError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_all_infinite_population_fails() {
        let f = |_: &[f64]| f64::INFINITY;
        let problem = MinimizationProblem::new(&f).with_bounds(unit_box(1));
        assert!(matches!(
            DifferentialEvolution.minimize(&problem, &DifferentialEvolutionSettings::default(), &[0.0]),
            Err(SolverError::NumericalInstability(_))
        ));
    }

    // ========================================
    // Cancellation Tests
    // ========================================

    #[test]
    fn test_cancelled_before_start() {
        let f = |x: &[f64]| x[0] * x[0];
        let token = CancellationToken::new();
        token.cancel();
        let problem = MinimizationProblem::new(&f)
            .with_bounds(unit_box(1))
            .with_cancellation(&token);
        let err = DifferentialEvolution
            .minimize(&problem, &DifferentialEvolutionSettings::default(), &[0.5])
            .unwrap_err();
        assert_eq!(err, SolverError::Cancelled { iterations: 0 });
    }

    #[test]
    fn test_cancelled_mid_search_stops_at_generation_boundary() {
        use std::cell::Cell;

        let token = CancellationToken::new();
        let calls = Cell::new(0usize);
        let f = |x: &[f64]| {
            calls.set(calls.get() + 1);
            // Request the abort during the first generation
            if calls.get() == 25 {
                token.cancel();
            }
            x[0] * x[0]
        };
        let problem = MinimizationProblem::new(&f)
            .with_bounds(unit_box(1))
            .with_cancellation(&token);
        let err = DifferentialEvolution
            .minimize(&problem, &DifferentialEvolutionSettings::default(), &[0.5])
            .unwrap_err();
        assert_eq!(err, SolverError::Cancelled { iterations: 1 });
        // Initial population plus one full generation
        assert_eq!(calls.get(), 40);
    }
}
