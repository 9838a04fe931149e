use std::convert::Infallible;

use aggreblend_core::Model;
use thiserror::Error;

use crate::{curve::GradationCurve, sieve::Sieve};

/// Allowed deviation of a proportion vector's sum from 1.
pub const PROPORTION_TOL: f64 = 1e-6;

/// Errors for malformed proportion vectors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidProportionsError {
    #[error("no proportions given")]
    Empty,

    #[error("expected {expected} proportions, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("proportion {index} is {value}, outside [0, 1]")]
    OutOfBounds { index: usize, value: f64 },

    #[error("proportions sum to {sum}, not 1")]
    BadSum { sum: f64 },
}

/// Mixing proportions, one per aggregate.
///
/// Every entry lies in `[0, 1]` and the entries sum to 1 within
/// [`PROPORTION_TOL`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<f64>", into = "Vec<f64>")
)]
pub struct ProportionVector(Vec<f64>);

impl ProportionVector {
    /// Validates and wraps a proportion vector.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty, an entry is outside `[0, 1]`
    /// (or NaN), or the sum differs from 1 by more than [`PROPORTION_TOL`].
    pub fn new(values: Vec<f64>) -> Result<Self, InvalidProportionsError> {
        if values.is_empty() {
            return Err(InvalidProportionsError::Empty);
        }
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(InvalidProportionsError::OutOfBounds {
                index,
                value: *value,
            });
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > PROPORTION_TOL {
            return Err(InvalidProportionsError::BadSum { sum });
        }
        Ok(Self(values))
    }

    /// Equal proportions for `count` aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProportionsError::Empty`] if `count` is zero.
    pub fn uniform(count: usize) -> Result<Self, InvalidProportionsError> {
        if count == 0 {
            return Err(InvalidProportionsError::Empty);
        }
        #[allow(clippy::cast_precision_loss)]
        let share = 1.0 / count as f64;
        Ok(Self(vec![share; count]))
    }

    /// Clamps every entry to `[0, 1]` and rescales the result to sum to 1.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty or nothing positive remains after
    /// clamping.
    pub fn normalized(values: &[f64]) -> Result<Self, InvalidProportionsError> {
        if values.is_empty() {
            return Err(InvalidProportionsError::Empty);
        }
        let clamped: Vec<f64> = values
            .iter()
            .map(|p| if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) })
            .collect();
        let sum: f64 = clamped.iter().sum();
        if sum <= 0.0 {
            return Err(InvalidProportionsError::BadSum { sum });
        }
        Ok(Self(clamped.into_iter().map(|p| p / sum).collect()))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl AsRef<[f64]> for ProportionVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for ProportionVector {
    type Error = InvalidProportionsError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<ProportionVector> for Vec<f64> {
    fn from(proportions: ProportionVector) -> Self {
        proportions.0
    }
}

/// Blends aggregate curves into a composite curve.
///
/// The composite passing at each sieve is the proportion-weighted sum of the
/// component passings.
///
/// # Errors
///
/// Returns an error if there is not exactly one proportion per curve.
pub fn blend(
    curves: &[GradationCurve],
    proportions: &ProportionVector,
) -> Result<GradationCurve, InvalidProportionsError> {
    if curves.len() != proportions.len() {
        return Err(InvalidProportionsError::LengthMismatch {
            expected: curves.len(),
            actual: proportions.len(),
        });
    }
    Ok(combine(curves, proportions.as_slice()))
}

/// Weighted sum of curves with no checks on the weights.
pub(crate) fn combine(curves: &[GradationCurve], weights: &[f64]) -> GradationCurve {
    let mut passing = [0.0; Sieve::COUNT];
    for (curve, weight) in curves.iter().zip(weights) {
        for (total, value) in passing.iter_mut().zip(curve.values()) {
            *total += weight * value;
        }
    }
    GradationCurve::from_array_unchecked(passing)
}

/// The blending step as a [`Model`] over raw weight vectors.
///
/// Weights are not validated, so the solver can probe points just outside
/// the simplex when estimating gradients.
#[derive(Debug, Clone)]
pub struct Blender {
    curves: Vec<GradationCurve>,
}

impl Blender {
    #[must_use]
    pub fn new(curves: Vec<GradationCurve>) -> Self {
        Self { curves }
    }

    #[must_use]
    pub fn curves(&self) -> &[GradationCurve] {
        &self.curves
    }
}

impl Model for Blender {
    type Input = Vec<f64>;
    type Output = GradationCurve;
    type Error = Infallible;

    fn call(&self, weights: &Vec<f64>) -> Result<Self::Output, Self::Error> {
        Ok(combine(&self.curves, weights))
    }
}
