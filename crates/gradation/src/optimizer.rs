//! Searches for the blend proportions that best match the references.
//!
//! The search minimizes `power45 + lambda * tarantula` over proportion
//! vectors with the spectral projected gradient solver. Proportions stay in
//! their bounds and sum to 1 at every accepted iterate; the optional
//! Shilstone fractions are added to the same constraint set rather than to
//! the objective.
//!
//! # Example
//!
//! ```
//! use aggreblend_gradation::{
//!     GradationCurve, OptimizationStatus, OptimizerConfig, ReferenceCurves, optimize,
//! };
//!
//! let gravel = GradationCurve::new([
//!     100.0, 100.0, 95.0, 70.0, 35.0, 15.0, 3.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
//! ])?;
//! let sand = GradationCurve::new([
//!     100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 96.0, 80.0, 62.0, 40.0, 17.0, 5.0, 1.5,
//! ])?;
//! let refs = ReferenceCurves::new(25.0)?;
//!
//! let result = optimize(&[gravel, sand], &refs, &OptimizerConfig::default())?;
//!
//! assert_ne!(result.status, OptimizationStatus::Infeasible);
//! let sum: f64 = result.proportions.as_slice().iter().sum();
//! assert!((sum - 1.0).abs() < 1e-6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod history;
mod problem;
mod result;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, OptimizerConfig};
pub use error::OptimizeError;
pub use problem::{BlendProblem, feasible_region};
pub use result::{OptimizationResult, OptimizationStatus};

use aggreblend_solvers::optimization::projected_gradient::{self, Config, Event, Status};

use crate::{
    blend::{Blender, InvalidProportionsError, ProportionVector, blend, combine},
    curve::GradationCurve,
    metrics::combined_error,
    reference::ReferenceCurves,
};

use history::IterationLog;

/// Finds the proportions that minimize the combined error of the blend.
///
/// Starts from the configured initial guess, or equal proportions. When the
/// constraints admit no blend at all, returns the initial guess with status
/// [`OptimizationStatus::Infeasible`].
///
/// # Errors
///
/// Returns an error if no curves are given, the initial guess or bounds do
/// not match the curves, or the solver fails.
pub fn optimize(
    curves: &[GradationCurve],
    refs: &ReferenceCurves,
    config: &OptimizerConfig,
) -> Result<OptimizationResult, OptimizeError> {
    let start = match config.initial_guess() {
        Some(guess) => guess.clone(),
        None => ProportionVector::uniform(curves.len())?,
    };
    if start.len() != curves.len() {
        return Err(InvalidProportionsError::LengthMismatch {
            expected: curves.len(),
            actual: start.len(),
        }
        .into());
    }

    let region = feasible_region(curves, config)?;
    let solver_config = solver_config(config)?;
    let lambda = config.lambda();

    tracing::info!(
        aggregates = curves.len(),
        lambda,
        shilstone_constraints = config.shilstone_constraints(),
        max_iterations = config.max_iterations(),
        "starting blend optimization"
    );

    let blender = Blender::new(curves.to_vec());
    let problem = BlendProblem::new(*refs, lambda);

    let projected = projected_gradient::project(
        &region,
        start.as_slice(),
        solver_config.projection_iters(),
    );
    let initial = combined_error(&combine(curves, &projected.x), refs, lambda);
    let mut log = IterationLog::new(problem, initial);

    let outcome = projected_gradient::minimize(
        &blender,
        &problem,
        &region,
        start.as_slice(),
        &solver_config,
        |event: &Event<'_, _, _>| log.record(event),
    );

    let solution = match outcome {
        Ok(solution) => solution,
        Err(projected_gradient::Error::Infeasible { violation }) => {
            tracing::warn!(violation, "blend constraints cannot be satisfied");
            return infeasible(curves, refs, lambda, start);
        }
        Err(err) => return Err(OptimizeError::Solver(err)),
    };

    let status = match solution.status {
        Status::Converged => OptimizationStatus::Converged,
        Status::MaxIters | Status::TimeLimit | Status::StoppedByObserver => {
            OptimizationStatus::IterationLimitReached
        }
    };

    let proportions = ProportionVector::normalized(&solution.x)?;
    let composite = blend(curves, &proportions)?;
    let score = combined_error(&composite, refs, lambda);

    tracing::info!(
        ?status,
        iterations = solution.iters,
        evaluations = solution.evaluations,
        combined = score.combined,
        "finished blend optimization"
    );

    Ok(OptimizationResult {
        status,
        proportions,
        score,
        composite,
        iterations: solution.iters,
        history: log.into_scores(),
    })
}

fn solver_config(config: &OptimizerConfig) -> Result<Config, OptimizeError> {
    let solver = Config::new(config.max_iterations(), config.tolerance(), config.tolerance())
        .map_err(|err| OptimizeError::Solver(err.into()))?;
    Ok(match config.time_budget() {
        Some(budget) => solver.with_time_budget(budget),
        None => solver,
    })
}

fn infeasible(
    curves: &[GradationCurve],
    refs: &ReferenceCurves,
    lambda: f64,
    start: ProportionVector,
) -> Result<OptimizationResult, OptimizeError> {
    let composite = blend(curves, &start)?;
    let score = combined_error(&composite, refs, lambda);
    Ok(OptimizationResult {
        status: OptimizationStatus::Infeasible,
        proportions: start,
        score,
        composite,
        iterations: 0,
        history: vec![score],
    })
}
