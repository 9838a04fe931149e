use aggreblend_core::RegionError;
use aggreblend_solvers::optimization::projected_gradient;
use thiserror::Error;

use crate::blend::InvalidProportionsError;

use super::ConfigError;

/// Errors that can occur when optimizing a blend.
///
/// An empty constraint set is not an error; it ends the run with
/// [`OptimizationStatus::Infeasible`](super::OptimizationStatus::Infeasible).
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error(transparent)]
    InvalidProportions(#[from] InvalidProportionsError),

    #[error("invalid optimizer config")]
    Config(#[from] ConfigError),

    #[error("expected bounds for {expected} aggregates, got {actual}")]
    BoundsLength { expected: usize, actual: usize },

    #[error("failed to build the constraint set")]
    Region(#[from] RegionError),

    #[error("solver failed")]
    Solver(#[source] projected_gradient::Error),
}
