//! Shared fixtures for the aggreblend integration tests.

use aggreblend_gradation::{CurveError, GradationCurve, MixContext, OptimizerConfig};
use serde::Deserialize;

/// A mix design problem as written in a TOML file.
#[derive(Debug, Deserialize)]
pub struct MixFile {
    pub context: MixContext,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    pub aggregates: Vec<Aggregate>,
}

/// One aggregate, measured on the standard stack or at its own openings.
#[derive(Debug, Deserialize)]
pub struct Aggregate {
    pub name: String,
    #[serde(default)]
    pub openings_mm: Option<Vec<f64>>,
    pub passing: Vec<f64>,
}

impl Aggregate {
    /// Builds the curve on the standard sieves.
    ///
    /// # Errors
    ///
    /// Returns an error if the measurements do not form a valid curve.
    pub fn curve(&self) -> Result<GradationCurve, CurveError> {
        match &self.openings_mm {
            Some(openings) => GradationCurve::from_openings(openings, &self.passing),
            None => GradationCurve::from_slice(&self.passing),
        }
    }
}

impl MixFile {
    /// Parses a mix file from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid mix file.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Builds every aggregate curve, in file order.
    ///
    /// # Errors
    ///
    /// Returns the first curve that fails to build.
    pub fn curves(&self) -> Result<Vec<GradationCurve>, CurveError> {
        self.aggregates.iter().map(Aggregate::curve).collect()
    }
}

/// Routes `tracing` output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
