use std::error::Error as StdError;

use thiserror::Error;

use crate::optimization::EvalError;

use super::config::ConfigError;

/// Errors that can occur during projected gradient search.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("problem has no variables")]
    NoVariables,

    #[error("expected {expected} variables, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("feasible region is empty (closest point violates a constraint by {violation:e})")]
    Infeasible { violation: f64 },

    #[error("objective is not finite at the starting point")]
    NonFiniteObjective,

    #[error("gradient component {index} is not finite")]
    NonFiniteGradient { index: usize },

    #[error("problem error")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),

    #[error("model call failed")]
    Model(#[source] Box<dyn StdError + Send + Sync>),
}

impl<ME, PE> From<EvalError<ME, PE>> for Error
where
    ME: StdError + Send + Sync + 'static,
    PE: StdError + Send + Sync + 'static,
{
    fn from(err: EvalError<ME, PE>) -> Self {
        match err {
            EvalError::Model(e) => Self::Model(Box::new(e)),
            EvalError::Problem(e) => Self::Problem(Box::new(e)),
        }
    }
}
