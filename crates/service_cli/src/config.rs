//! Solver settings for the CLI.
//!
//! Settings come from, in increasing priority:
//! 1. Built-in defaults
//! 2. The TOML file named by `--config` (skipped when absent)
//! 3. `NEUTRYX_HW__*` environment variables, e.g.
//!    `NEUTRYX_HW__BFGS__MAX_ITERATIONS=200`

use std::fmt;

use config::{Config, Environment, File, FileFormat, Map};
use pricer_core::math::solvers::{BfgsSettings, DifferentialEvolutionSettings};
use pricer_optimiser::calibration::CalibrationConfig;
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "NEUTRYX_HW";

/// Effective settings for a calibration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Initial guess, parameter bounds and quoting conventions
    pub calibration: CalibrationConfig,
    /// Global stage
    pub differential_evolution: DifferentialEvolutionSettings,
    /// Local stage
    pub bfgs: BfgsSettings,
}

impl CliConfig {
    /// Load from `path` (optional) and the process environment.
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        Self::from_sources(path, None)
    }

    /// Load from `path` with environment overrides taken from `env` instead
    /// of the process environment when given.
    pub fn from_sources(
        path: &str,
        env: Option<Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

impl fmt::Display for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.calibration;
        let de = &self.differential_evolution;
        let bfgs = &self.bfgs;

        writeln!(f, "[calibration]")?;
        writeln!(f, "  initial_guess         = {:?}", c.initial_guess)?;
        writeln!(
            f,
            "  alpha bounds          = [{}, {}]",
            c.bounds[0].min, c.bounds[0].max
        )?;
        writeln!(
            f,
            "  sigma bounds          = [{}, {}]",
            c.bounds[1].min, c.bounds[1].max
        )?;
        writeln!(f, "  volatility_type       = {}", c.volatility_type)?;
        writeln!(f, "  swaption_type         = {}", c.swaption_type)?;
        writeln!(f, "[differential_evolution]")?;
        writeln!(f, "  population_size       = {}", de.population_size)?;
        writeln!(f, "  max_generations       = {}", de.max_generations)?;
        writeln!(f, "  mutation_factor       = {}", de.mutation_factor)?;
        writeln!(f, "  crossover_probability = {}", de.crossover_probability)?;
        writeln!(f, "  seed                  = {}", de.seed)?;
        writeln!(f, "[bfgs]")?;
        writeln!(f, "  step_size             = {:e}", bfgs.step_size)?;
        writeln!(f, "  epsilon               = {:e}", bfgs.epsilon)?;
        writeln!(f, "  max_iterations        = {}", bfgs.max_iterations)?;
        write!(f, "  scheme                = {:?}", bfgs.scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::math::solvers::FiniteDifferenceScheme;
    use pricer_models::instruments::rates::VolatilityType;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    // ========================================
    // Defaults
    // ========================================

    #[test]
    fn test_missing_file_gives_defaults() {
        let config =
            CliConfig::from_sources("/nonexistent/neutryx-hw.toml", Some(Map::new())).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.differential_evolution.population_size, 20);
        assert_eq!(config.differential_evolution.max_generations, 5);
        assert_eq!(config.bfgs.max_iterations, 1000);
        assert_eq!(config.bfgs.scheme, FiniteDifferenceScheme::FivePoint);
    }

    // ========================================
    // File and environment sources
    // ========================================

    #[test]
    fn test_file_overrides_defaults() {
        let path = temp_file(
            "file-overrides.toml",
            r#"
[calibration]
initial_guess = [0.05, 0.02]
volatility_type = "Normal"

[differential_evolution]
max_generations = 12
"#,
        );

        let config = CliConfig::from_sources(path.to_str().unwrap(), Some(Map::new())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.calibration.initial_guess, [0.05, 0.02]);
        assert_eq!(config.calibration.volatility_type, VolatilityType::Normal);
        assert_eq!(config.differential_evolution.max_generations, 12);
        // untouched sections keep their defaults
        assert_eq!(config.differential_evolution.population_size, 20);
        assert_eq!(config.bfgs, BfgsSettings::default());
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = temp_file(
            "env-overrides.toml",
            "[bfgs]\nmax_iterations = 50\n",
        );
        let mut env = Map::new();
        env.insert(
            "NEUTRYX_HW__BFGS__MAX_ITERATIONS".to_string(),
            "200".to_string(),
        );
        env.insert(
            "NEUTRYX_HW__DIFFERENTIAL_EVOLUTION__SEED".to_string(),
            "11".to_string(),
        );

        let config = CliConfig::from_sources(path.to_str().unwrap(), Some(env)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.bfgs.max_iterations, 200);
        assert_eq!(config.differential_evolution.seed, 11);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_file("malformed.toml", "[bfgs]\nmax_iterations = \"many\"\n");
        let result = CliConfig::from_sources(path.to_str().unwrap(), Some(Map::new()));
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_display_lists_every_section() {
        let text = CliConfig::default().to_string();
        assert!(text.contains("[calibration]"));
        assert!(text.contains("[differential_evolution]"));
        assert!(text.contains("[bfgs]"));
        assert!(text.contains("population_size       = 20"));
    }
}
