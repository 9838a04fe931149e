use std::time::Duration;

use thiserror::Error;

/// Configuration for the projected gradient solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    objective_tol: f64,
    step_tol: f64,
    fd_step: f64,
    initial_step: f64,
    armijo: f64,
    max_backtracks: usize,
    feasibility_tol: f64,
    projection_iters: usize,
    time_budget: Option<Duration>,
}

/// Errors that can occur when validating a projected gradient solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("objective_tol must be finite and non-negative")]
    ObjectiveTol,

    #[error("step_tol must be finite and non-negative")]
    StepTol,

    #[error("fd_step must be finite and positive")]
    FdStep,

    #[error("initial_step must be finite and positive")]
    InitialStep,

    #[error("armijo must lie in (0, 1)")]
    Armijo,

    #[error("feasibility_tol must be finite and positive")]
    FeasibilityTol,

    #[error("projection_iters must be at least 1")]
    ProjectionIters,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 200,
            objective_tol: 1e-6,
            step_tol: 1e-9,
            fd_step: 1e-6,
            initial_step: 0.1,
            armijo: 1e-4,
            max_backtracks: 40,
            feasibility_tol: 1e-7,
            projection_iters: 2_000,
            time_budget: None,
        }
    }
}

impl Config {
    /// Creates a config with the given iteration limit and tolerances.
    ///
    /// Remaining settings take their default values and can be changed with
    /// the `with_*` methods.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite.
    pub fn new(max_iters: usize, objective_tol: f64, step_tol: f64) -> Result<Self, ConfigError> {
        if !objective_tol.is_finite() || objective_tol < 0.0 {
            return Err(ConfigError::ObjectiveTol);
        }
        if !step_tol.is_finite() || step_tol < 0.0 {
            return Err(ConfigError::StepTol);
        }

        Ok(Self {
            max_iters,
            objective_tol,
            step_tol,
            ..Self::default()
        })
    }

    /// Sets the central-difference step used to estimate gradients.
    ///
    /// # Errors
    ///
    /// Returns an error if `fd_step` is not finite and positive.
    pub fn with_fd_step(mut self, fd_step: f64) -> Result<Self, ConfigError> {
        if !fd_step.is_finite() || fd_step <= 0.0 {
            return Err(ConfigError::FdStep);
        }
        self.fd_step = fd_step;
        Ok(self)
    }

    /// Sets the largest coordinate move of the first trial step.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial_step` is not finite and positive.
    pub fn with_initial_step(mut self, initial_step: f64) -> Result<Self, ConfigError> {
        if !initial_step.is_finite() || initial_step <= 0.0 {
            return Err(ConfigError::InitialStep);
        }
        self.initial_step = initial_step;
        Ok(self)
    }

    /// Sets the Armijo sufficient-decrease parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if `armijo` is not strictly between 0 and 1.
    pub fn with_armijo(mut self, armijo: f64) -> Result<Self, ConfigError> {
        if !(armijo > 0.0 && armijo < 1.0) {
            return Err(ConfigError::Armijo);
        }
        self.armijo = armijo;
        Ok(self)
    }

    /// Sets the maximum number of step halvings per line search.
    #[must_use]
    pub fn with_max_backtracks(mut self, max_backtracks: usize) -> Self {
        self.max_backtracks = max_backtracks;
        self
    }

    /// Sets the largest constraint violation an iterate may have.
    ///
    /// # Errors
    ///
    /// Returns an error if `feasibility_tol` is not finite and positive.
    pub fn with_feasibility_tol(mut self, feasibility_tol: f64) -> Result<Self, ConfigError> {
        if !feasibility_tol.is_finite() || feasibility_tol <= 0.0 {
            return Err(ConfigError::FeasibilityTol);
        }
        self.feasibility_tol = feasibility_tol;
        Ok(self)
    }

    /// Sets the maximum number of Dykstra cycles per projection.
    ///
    /// # Errors
    ///
    /// Returns an error if `projection_iters` is zero.
    pub fn with_projection_iters(mut self, projection_iters: usize) -> Result<Self, ConfigError> {
        if projection_iters == 0 {
            return Err(ConfigError::ProjectionIters);
        }
        self.projection_iters = projection_iters;
        Ok(self)
    }

    /// Sets a wall-clock budget for the whole search.
    #[must_use]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Returns the maximum number of accepted iterations.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the relative tolerance on the objective change between iterates.
    #[must_use]
    pub fn objective_tol(&self) -> f64 {
        self.objective_tol
    }

    /// Returns the tolerance on the projected-gradient step norm.
    #[must_use]
    pub fn step_tol(&self) -> f64 {
        self.step_tol
    }

    #[must_use]
    pub fn fd_step(&self) -> f64 {
        self.fd_step
    }

    #[must_use]
    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }

    #[must_use]
    pub fn armijo(&self) -> f64 {
        self.armijo
    }

    #[must_use]
    pub fn max_backtracks(&self) -> usize {
        self.max_backtracks
    }

    #[must_use]
    pub fn feasibility_tol(&self) -> f64 {
        self.feasibility_tol
    }

    #[must_use]
    pub fn projection_iters(&self) -> usize {
        self.projection_iters
    }

    #[must_use]
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }
}
