//! Calibrate command implementation
//!
//! Loads a request file, calibrates Hull-White `(alpha, sigma)` with
//! pricer_optimiser and reports the result.

use std::fmt::{self, Write as _};

use pricer_core::math::solvers::{Bfgs, CancellationToken, DifferentialEvolution};
use pricer_optimiser::calibration::{CalibrationOrchestrator, CalibrationResult};
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::request::CalibrationRequest;
use crate::{CliError, Result};

/// Run the calibrate command
pub fn run(input: &str, output: Option<&str>, config: &CliConfig) -> Result<()> {
    info!("Starting calibration...");
    info!("  Request: {}", input);

    let request = CalibrationRequest::from_path(input)?;
    let result = calibrate_request(&request, config, &CancellationToken::new())?;

    println!("{}", render_summary(&result)?);

    if let Some(output_path) = output {
        info!("Writing calibration result to: {}", output_path);
        write_result(&result, output_path)?;
    }

    if result.is_success() {
        info!("Calibration complete");
        Ok(())
    } else {
        let message = result.message.unwrap_or_default();
        warn!("Calibration failed: {}", message);
        Err(CliError::CalibrationFailed(message))
    }
}

/// Calibrate one parsed request with the configured solvers.
pub fn calibrate_request(
    request: &CalibrationRequest,
    config: &CliConfig,
    token: &CancellationToken,
) -> Result<CalibrationResult> {
    let curve = request.zero_curve()?;
    let surface = request.volatility_surface()?;
    let criteria = request.filter_criteria();

    let orchestrator = CalibrationOrchestrator::with_solvers(
        DifferentialEvolution,
        config.differential_evolution,
        Bfgs,
        config.bfgs,
        config.calibration,
    );

    Ok(orchestrator.calibrate(&curve, &surface, &criteria, request.tenor_step, token))
}

/// Serialise `result` as pretty JSON to `path`.
pub fn write_result(result: &CalibrationResult, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).map_err(|source| CliError::Io {
        path: path.to_string(),
        source,
    })
}

/// Human-readable summary table.
pub fn render_summary(result: &CalibrationResult) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "========================================")?;
    writeln!(out, "Hull-White Calibration: {:?}", result.status)?;
    writeln!(out, "========================================")?;

    if let Some(message) = &result.message {
        writeln!(out, "{:<16} {}", "Message", message)?;
        if let Some(kind) = result.error_kind {
            writeln!(out, "{:<16} {:?}", "Error kind", kind)?;
        }
    }

    for parameter in &result.parameters {
        writeln!(out, "{:<16} {:>14.8}", parameter.name, parameter.value)?;
    }

    if let Some(diag) = &result.diagnostics {
        writeln!(out, "----------------------------------------")?;
        writeln!(out, "{:<16} {:>14.6e}", "Objective", diag.objective_value)?;
        writeln!(out, "{:<16} {:>14.6e}", "RMSE", diag.rmse)?;
        writeln!(out, "{:<16} {:>14.6e}", "Max error", diag.max_error)?;
        writeln!(
            out,
            "{:<16} {:>14}",
            "Instruments",
            diag.maturities.len() * diag.durations.len()
        )?;
        writeln!(out, "{:<16} {:>14}", "Tenor step", diag.tenor_step)?;
        writeln!(
            out,
            "{:<16} {:>14}",
            "Iterations",
            format!("{} + {}", diag.global_iterations, diag.local_iterations)
        )?;
        writeln!(out, "{:<16} {:>14}", "Evaluations", diag.evaluations)?;
        writeln!(out, "{:<16} {:>14}", "Converged", diag.local_converged)?;
    }

    for warning in &result.warnings {
        writeln!(out, "warning: {}", warning)?;
    }

    Ok(out.trim_end().to_string())
}
