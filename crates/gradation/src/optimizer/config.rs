use std::time::Duration;

use thiserror::Error;

use crate::{blend::ProportionVector, reference::Band};

/// Configuration for blend optimization.
///
/// With the `serde-derive` feature this deserializes from snake_case fields,
/// each optional, and the result is validated like [`OptimizerConfig::new`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ConfigFile", into = "ConfigFile")
)]
pub struct OptimizerConfig {
    lambda: f64,
    enable_shilstone_constraints: bool,
    max_iterations: usize,
    tolerance: f64,
    time_budget: Option<Duration>,
    bounds: Option<Vec<Band>>,
    initial_guess: Option<ProportionVector>,
}

/// Errors that can occur when validating an [`OptimizerConfig`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("lambda must be finite and non-negative, got {0}")]
    Lambda(f64),

    #[error("tolerance must be finite and positive, got {0}")]
    Tolerance(f64),

    #[error("time budget must be finite and non-negative, got {0} s")]
    TimeBudget(f64),

    #[error("bounds for aggregate {index} must satisfy 0 <= lower <= upper <= 1")]
    Bounds { index: usize },

    #[error("invalid initial guess: {0}")]
    InitialGuess(#[from] crate::blend::InvalidProportionsError),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            lambda: 0.5,
            enable_shilstone_constraints: false,
            max_iterations: 200,
            tolerance: 1e-6,
            time_budget: None,
            bounds: None,
            initial_guess: None,
        }
    }
}

impl OptimizerConfig {
    /// Creates a config with the given Tarantula weight, iteration limit, and
    /// convergence tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `lambda` is negative or `tolerance` is not positive.
    pub fn new(lambda: f64, max_iterations: usize, tolerance: f64) -> Result<Self, ConfigError> {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(ConfigError::Lambda(lambda));
        }
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::Tolerance(tolerance));
        }
        Ok(Self {
            lambda,
            max_iterations,
            tolerance,
            ..Self::default()
        })
    }

    /// Adds the Shilstone fine and coarse fractions as hard constraints.
    #[must_use]
    pub fn with_shilstone_constraints(mut self, enabled: bool) -> Self {
        self.enable_shilstone_constraints = enabled;
        self
    }

    /// Sets a wall-clock budget for the search.
    #[must_use]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Restricts each proportion to its own `[lower, upper]` range.
    ///
    /// # Errors
    ///
    /// Returns an error if a range is not inside `[0, 1]` or is inverted.
    pub fn with_bounds(mut self, bounds: Vec<Band>) -> Result<Self, ConfigError> {
        validate_bounds(&bounds)?;
        self.bounds = Some(bounds);
        Ok(self)
    }

    /// Starts the search from `guess` instead of equal proportions.
    #[must_use]
    pub fn with_initial_guess(mut self, guess: ProportionVector) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    /// Returns the weight of the Tarantula error in the combined error.
    #[must_use]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    #[must_use]
    pub fn shilstone_constraints(&self) -> bool {
        self.enable_shilstone_constraints
    }

    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Returns the convergence tolerance.
    ///
    /// Applies both to the relative change in combined error between accepted
    /// iterates and to the projected step length.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }

    #[must_use]
    pub fn bounds(&self) -> Option<&[Band]> {
        self.bounds.as_deref()
    }

    #[must_use]
    pub fn initial_guess(&self) -> Option<&ProportionVector> {
        self.initial_guess.as_ref()
    }
}

fn validate_bounds(bounds: &[Band]) -> Result<(), ConfigError> {
    for (index, band) in bounds.iter().enumerate() {
        let ok = band.lower >= 0.0 && band.upper <= 1.0 && band.lower <= band.upper;
        if !ok {
            return Err(ConfigError::Bounds { index });
        }
    }
    Ok(())
}

/// On-disk form of [`OptimizerConfig`].
#[cfg(feature = "serde-derive")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    lambda: f64,
    enable_shilstone_constraints: bool,
    max_iterations: usize,
    tolerance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_budget_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<Vec<Band>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_guess: Option<Vec<f64>>,
}

#[cfg(feature = "serde-derive")]
impl Default for ConfigFile {
    fn default() -> Self {
        OptimizerConfig::default().into()
    }
}

#[cfg(feature = "serde-derive")]
impl TryFrom<ConfigFile> for OptimizerConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let mut config = Self::new(file.lambda, file.max_iterations, file.tolerance)?
            .with_shilstone_constraints(file.enable_shilstone_constraints);

        if let Some(secs) = file.time_budget_secs {
            let budget =
                Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::TimeBudget(secs))?;
            config = config.with_time_budget(budget);
        }
        if let Some(bounds) = file.bounds {
            config = config.with_bounds(bounds)?;
        }
        if let Some(guess) = file.initial_guess {
            config = config.with_initial_guess(ProportionVector::new(guess)?);
        }
        Ok(config)
    }
}

#[cfg(feature = "serde-derive")]
impl From<OptimizerConfig> for ConfigFile {
    fn from(config: OptimizerConfig) -> Self {
        Self {
            lambda: config.lambda,
            enable_shilstone_constraints: config.enable_shilstone_constraints,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            time_budget_secs: config.time_budget.map(|d| d.as_secs_f64()),
            bounds: config.bounds,
            initial_guess: config.initial_guess.map(Vec::from),
        }
    }
}
