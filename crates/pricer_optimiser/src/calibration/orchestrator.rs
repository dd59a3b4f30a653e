//! Two-stage Hull-White calibration.
//!
//! ```text
//! filter → reference prices → global search → local refinement → result
//! ```
//!
//! Each arrow can fail; the first failure ends the run and becomes a failed
//! [`CalibrationResult`].

use pricer_core::market_data::curves::ZeroCurve;
use pricer_core::math::solvers::{
    Bfgs, BfgsSettings, CancellationToken, DifferentialEvolution, DifferentialEvolutionSettings,
    MinimizationProblem, Minimizer, Solution,
};
use tracing::{info, warn};

use super::config::CalibrationConfig;
use super::instruments::SwaptionGrid;
use super::model::ModelPricer;
use super::objective::CalibrationObjective;
use super::reference::{resolve_tenor_step, ReferencePricer};
use super::result::{CalibrationDiagnostics, CalibrationResult};
use super::surface::{FilterCriteria, SurfaceFilter, VolatilitySurface};
use crate::error::{CalibrationError, SolveStage};

/// Runs a global minimiser then a local one over the calibration objective.
///
/// The default pair is differential evolution (20 members, 5 generations)
/// followed by five-point finite-difference BFGS (step and epsilon `1e-7`,
/// 1000 iterations). Any other [`Minimizer`] pair can be supplied through
/// [`CalibrationOrchestrator::with_solvers`].
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::ZeroCurve;
/// use pricer_core::math::solvers::CancellationToken;
/// use pricer_optimiser::calibration::{
///     CalibrationOrchestrator, FilterCriteria, VolatilitySurface,
/// };
///
/// let curve = ZeroCurve::flat(0.02_f64);
/// let surface = VolatilitySurface::new(vec![5.0], vec![5.0], vec![vec![0.01]]).unwrap();
///
/// let result = CalibrationOrchestrator::new().calibrate(
///     &curve,
///     &surface,
///     &FilterCriteria::default(),
///     Some(1.0),
///     &CancellationToken::new(),
/// );
/// assert!(result.is_success());
/// assert!(result.objective_value().unwrap() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct CalibrationOrchestrator<G = DifferentialEvolution, L = Bfgs>
where
    G: Minimizer,
    L: Minimizer,
{
    global: G,
    global_settings: G::Settings,
    local: L,
    local_settings: L::Settings,
    config: CalibrationConfig,
}

impl CalibrationOrchestrator {
    /// Default solvers and settings.
    pub fn new() -> Self {
        Self::with_config(CalibrationConfig::default())
    }

    /// Default solvers with custom calibration settings.
    pub fn with_config(config: CalibrationConfig) -> Self {
        Self::with_solvers(
            DifferentialEvolution,
            DifferentialEvolutionSettings::default(),
            Bfgs,
            BfgsSettings::default(),
            config,
        )
    }
}

impl Default for CalibrationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl<G, L> CalibrationOrchestrator<G, L>
where
    G: Minimizer,
    L: Minimizer,
{
    /// Use `global` then `local`, each with its own settings.
    pub fn with_solvers(
        global: G,
        global_settings: G::Settings,
        local: L,
        local_settings: L::Settings,
        config: CalibrationConfig,
    ) -> Self {
        Self {
            global,
            global_settings,
            local,
            local_settings,
            config,
        }
    }

    /// Calibration settings.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Settings of the global stage.
    pub fn global_settings(&self) -> &G::Settings {
        &self.global_settings
    }

    /// Settings of the local stage.
    pub fn local_settings(&self) -> &L::Settings {
        &self.local_settings
    }

    /// Calibrate `(alpha, sigma)` to the cells of `surface` admitted by `criteria`.
    ///
    /// Never fails: every error is reported as a failed result carrying the
    /// error message. A missing or non-positive `tenor_step` falls back to
    /// one year with a warning.
    pub fn calibrate(
        &self,
        curve: &ZeroCurve<f64>,
        surface: &VolatilitySurface,
        criteria: &FilterCriteria,
        tenor_step: Option<f64>,
        cancellation: &CancellationToken,
    ) -> CalibrationResult {
        let mut warnings = Vec::new();
        match self.run(curve, surface, criteria, tenor_step, cancellation, &mut warnings) {
            Ok((params, diagnostics)) => {
                info!(
                    alpha = params[0],
                    sigma = params[1],
                    objective = diagnostics.objective_value,
                    "calibration succeeded"
                );
                CalibrationResult::success(
                    &params,
                    curve.dates().to_vec(),
                    curve.rates().to_vec(),
                    diagnostics,
                    warnings,
                )
            }
            Err(err) => {
                warn!(error = %err, "calibration failed");
                CalibrationResult::failure(&err, warnings)
            }
        }
    }

    fn run(
        &self,
        curve: &ZeroCurve<f64>,
        surface: &VolatilitySurface,
        criteria: &FilterCriteria,
        tenor_step: Option<f64>,
        cancellation: &CancellationToken,
        warnings: &mut Vec<String>,
    ) -> Result<(Vec<f64>, CalibrationDiagnostics), CalibrationError> {
        self.config.validate()?;

        let grid = SurfaceFilter::filter(surface, criteria);
        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            "filtered volatility surface"
        );
        if grid.is_empty() {
            return Err(CalibrationError::EmptyFilterResult);
        }

        let (step, notice) = resolve_tenor_step(tenor_step);
        warnings.extend(notice);

        let swaptions = SwaptionGrid::build(curve, &grid, step)?;
        let reference = ReferencePricer::new(self.config.volatility_type, self.config.swaption_type)
            .price_swaptions(&swaptions, &grid)?;
        info!(cells = grid.len(), tenor_step = step, "priced reference swaptions");

        let objective = CalibrationObjective::new(
            swaptions,
            reference,
            ModelPricer::new(self.config.swaption_type),
        )?;

        let global = self.global_search(&objective, cancellation)?;
        let start = if global.value.is_finite() {
            global.params.clone()
        } else {
            let notice = format!(
                "{} found no finite objective value, refining from the initial guess",
                self.global.name()
            );
            warn!("{}", notice);
            warnings.push(notice);
            self.config.initial_guess.to_vec()
        };

        let local = self.local_refinement(&objective, &start, cancellation)?;
        if !local.converged {
            let notice = format!(
                "{} stopped after {} iterations without meeting its tolerance",
                self.local.name(),
                local.iterations
            );
            warn!("{}", notice);
            warnings.push(notice);
        }

        // strategies that ignore bounds still publish an in-domain point
        let params: Vec<f64> = local
            .params
            .iter()
            .zip(&self.config.bounds)
            .map(|(&p, b)| b.clamp(p))
            .collect();

        let fit = objective.evaluate_with_diagnostics(&params)?;
        let cells = objective.swaptions().len().max(1) as f64;
        let diagnostics = CalibrationDiagnostics {
            objective_value: fit.value,
            rmse: (fit.value / cells).sqrt(),
            max_error: fit.errors.max_abs(),
            pricing_errors: fit.errors,
            reference_prices: objective.reference_prices().clone(),
            maturities: grid.maturities().to_vec(),
            durations: grid.durations().to_vec(),
            tenor_step: step,
            global_iterations: global.iterations,
            local_iterations: local.iterations,
            evaluations: global.evaluations + local.evaluations,
            local_converged: local.converged,
        };

        Ok((params, diagnostics))
    }

    /// Coarse bounded search from the configured initial guess.
    pub fn global_search(
        &self,
        objective: &CalibrationObjective,
        cancellation: &CancellationToken,
    ) -> Result<Solution, CalibrationError> {
        info!(solver = self.global.name(), "starting global search");
        let problem = MinimizationProblem::new(objective)
            .with_bounds(self.config.bounds.to_vec())
            .with_cancellation(cancellation);

        let solution = self
            .global
            .minimize(&problem, &self.global_settings, &self.config.initial_guess)
            .map_err(|e| CalibrationError::from_solver(SolveStage::GlobalSearch, e))?;

        info!(
            value = solution.value,
            iterations = solution.iterations,
            "global search finished"
        );
        Ok(solution)
    }

    /// Refinement from `start` inside the configured bounds.
    pub fn local_refinement(
        &self,
        objective: &CalibrationObjective,
        start: &[f64],
        cancellation: &CancellationToken,
    ) -> Result<Solution, CalibrationError> {
        info!(solver = self.local.name(), "starting local refinement");
        let problem = MinimizationProblem::new(objective)
            .with_bounds(self.config.bounds.to_vec())
            .with_cancellation(cancellation);

        let solution = self
            .local
            .minimize(&problem, &self.local_settings, start)
            .map_err(|e| CalibrationError::from_solver(SolveStage::LocalRefinement, e))?;

        info!(
            value = solution.value,
            iterations = solution.iterations,
            converged = solution.converged,
            "local refinement finished"
        );
        Ok(solution)
    }
}
