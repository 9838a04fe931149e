use thiserror::Error;

use crate::{
    interpolation::{InterpError, LogOpeningInterp},
    sieve::{DomainError, Sieve},
};

/// Slack allowed when checking that passing never increases down the stack.
const MONOTONE_TOL: f64 = 1e-9;

/// Errors that can occur when constructing a [`GradationCurve`].
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("expected {expected} passing values, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("percent passing at {sieve} is {value}, outside [0, 100]")]
    OutOfRange { sieve: Sieve, value: f64 },

    #[error("percent passing at {sieve} ({value}) exceeds the coarser sieve ({coarser})")]
    NotMonotone {
        sieve: Sieve,
        value: f64,
        coarser: f64,
    },

    #[error("failed to resample measured openings")]
    Interpolation(#[from] InterpError),
}

/// Percent passing at each standard sieve for one aggregate (or a blend).
///
/// Values lie in `[0, 100]` and never increase from the coarsest sieve to the
/// finest. Both properties are checked on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<f64>", into = "Vec<f64>")
)]
pub struct GradationCurve {
    passing: [f64; Sieve::COUNT],
}

impl GradationCurve {
    /// Creates a curve from percent passing at every sieve, coarsest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a value lies outside `[0, 100]` (or is NaN), or a
    /// value exceeds the one at the next coarser sieve.
    pub fn new(passing: [f64; Sieve::COUNT]) -> Result<Self, CurveError> {
        for sieve in Sieve::ALL {
            let value = passing[sieve.index()];
            if !(0.0..=100.0).contains(&value) {
                return Err(CurveError::OutOfRange { sieve, value });
            }
            if let Some(coarser) = sieve.coarser().map(|c| passing[c.index()]) {
                if value > coarser + MONOTONE_TOL {
                    return Err(CurveError::NotMonotone {
                        sieve,
                        value,
                        coarser,
                    });
                }
            }
        }
        Ok(Self { passing })
    }

    /// Creates a curve from a slice of 13 values, coarsest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice has the wrong length or fails [`Self::new`].
    pub fn from_slice(passing: &[f64]) -> Result<Self, CurveError> {
        let passing: [f64; Sieve::COUNT] =
            passing.try_into().map_err(|_| CurveError::WrongLength {
                expected: Sieve::COUNT,
                actual: passing.len(),
            })?;
        Self::new(passing)
    }

    /// Resamples a curve measured at arbitrary openings onto the standard sieves.
    ///
    /// Uses linear interpolation on `ln(opening)` with clamped extrapolation,
    /// see [`LogOpeningInterp`].
    ///
    /// # Errors
    ///
    /// Returns an error if the measurements cannot be interpolated or the
    /// resampled curve is invalid.
    pub fn from_openings(openings_mm: &[f64], passing: &[f64]) -> Result<Self, CurveError> {
        let interp = LogOpeningInterp::new(openings_mm, passing)?;
        let mut resampled = [0.0; Sieve::COUNT];
        for sieve in Sieve::ALL {
            resampled[sieve.index()] = interp.passing_at(sieve.opening_mm())?;
        }
        Self::new(resampled)
    }

    /// Builds a curve without validation.
    ///
    /// Used for weighted combinations of valid curves, which stay valid when
    /// the weights are, and for solver probes slightly outside the simplex.
    pub(crate) fn from_array_unchecked(passing: [f64; Sieve::COUNT]) -> Self {
        Self { passing }
    }

    #[must_use]
    pub fn percent_passing(&self, sieve: Sieve) -> f64 {
        self.passing[sieve.index()]
    }

    /// Percent passing at the sieve with the given opening.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownOpening`] for non-standard openings.
    pub fn percent_passing_at(&self, opening_mm: f64) -> Result<f64, DomainError> {
        Sieve::from_opening_mm(opening_mm).map(|sieve| self.percent_passing(sieve))
    }

    /// Percent retained between `coarse` and `fine`: `passing(coarse) - passing(fine)`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotCoarser`] unless `coarse` is strictly coarser.
    pub fn retained_between(&self, coarse: Sieve, fine: Sieve) -> Result<f64, DomainError> {
        if !coarse.is_coarser_than(fine) {
            return Err(DomainError::NotCoarser { coarse, fine });
        }
        Ok(self.percent_passing(coarse) - self.percent_passing(fine))
    }

    /// Percent retained on `sieve` alone.
    ///
    /// For the top sieve this is everything that does not pass it.
    #[must_use]
    pub fn retained_on(&self, sieve: Sieve) -> f64 {
        let above = sieve.coarser().map_or(100.0, |c| self.percent_passing(c));
        above - self.percent_passing(sieve)
    }

    /// Percent retained on every sieve, coarsest first.
    #[must_use]
    pub fn retained_profile(&self) -> [f64; Sieve::COUNT] {
        Sieve::ALL.map(|sieve| self.retained_on(sieve))
    }

    /// Percent passing values, coarsest first.
    #[must_use]
    pub fn values(&self) -> &[f64; Sieve::COUNT] {
        &self.passing
    }

    /// Iterates over `(sieve, percent passing)` pairs, coarsest first.
    pub fn iter(&self) -> impl Iterator<Item = (Sieve, f64)> + '_ {
        Sieve::ALL.into_iter().zip(self.passing.iter().copied())
    }

    /// Returns `true` if passing never increases down the stack.
    #[must_use]
    pub fn is_monotone(&self) -> bool {
        self.passing
            .windows(2)
            .all(|pair| pair[1] <= pair[0] + MONOTONE_TOL)
    }
}

impl TryFrom<Vec<f64>> for GradationCurve {
    type Error = CurveError;

    fn try_from(passing: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&passing)
    }
}

impl From<GradationCurve> for Vec<f64> {
    fn from(curve: GradationCurve) -> Self {
        curve.passing.to_vec()
    }
}
