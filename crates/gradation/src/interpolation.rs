use ndarray::Array1;
use ninterp::{
    error::{InterpolateError, ValidateError},
    interpolator::Extrapolate,
    prelude::{Interp1DOwned, Interpolator},
    strategy::Linear,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterpError {
    #[error("need at least two measured openings, got {0}")]
    TooFewPoints(usize),

    #[error("got {openings} openings but {values} passing values")]
    LengthMismatch { openings: usize, values: usize },

    #[error("opening {0} mm is not finite and positive")]
    InvalidOpening(f64),

    #[error("opening {0} mm appears more than once")]
    DuplicateOpening(f64),

    #[error(transparent)]
    Validation(#[from] ValidateError),

    #[error(transparent)]
    Interpolation(#[from] InterpolateError),
}

/// Linear interpolation of percent passing against `ln(opening)`.
///
/// Sieve openings are roughly geometric, so interpolating in log space keeps
/// the curve shape between measured sieves. Openings beyond the measured
/// range take the value of the nearest measured opening, and results are
/// clamped to `[0, 100]`.
pub struct LogOpeningInterp {
    interp: Interp1DOwned<f64, Linear>,
}

impl LogOpeningInterp {
    /// Builds the interpolator from measured `(opening, passing)` pairs in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given, the slices differ
    /// in length, an opening is non-positive or repeated, or a value is not finite.
    pub fn new(openings_mm: &[f64], passing: &[f64]) -> Result<Self, InterpError> {
        if openings_mm.len() != passing.len() {
            return Err(InterpError::LengthMismatch {
                openings: openings_mm.len(),
                values: passing.len(),
            });
        }
        if openings_mm.len() < 2 {
            return Err(InterpError::TooFewPoints(openings_mm.len()));
        }
        if let Some(bad) = openings_mm.iter().find(|d| !d.is_finite() || **d <= 0.0) {
            return Err(InterpError::InvalidOpening(*bad));
        }

        let mut points: Vec<(f64, f64)> = openings_mm
            .iter()
            .zip(passing)
            .map(|(d, p)| (d.ln(), *p))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        if let Some(pair) = points.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(InterpError::DuplicateOpening(pair[0].0.exp()));
        }

        let x: Array1<f64> = points.iter().map(|(x, _)| *x).collect();
        let f_x: Array1<f64> = points.iter().map(|(_, f)| *f).collect();
        let interp = Interp1DOwned::new(x, f_x, Linear, Extrapolate::Clamp)?;

        Ok(Self { interp })
    }

    /// Returns the interpolated percent passing at `opening_mm`.
    ///
    /// # Errors
    ///
    /// Returns an error if `opening_mm` is not finite and positive.
    pub fn passing_at(&self, opening_mm: f64) -> Result<f64, InterpError> {
        if !opening_mm.is_finite() || opening_mm <= 0.0 {
            return Err(InterpError::InvalidOpening(opening_mm));
        }
        let value = self.interp.interpolate(&[opening_mm.ln()])?;
        Ok(value.clamp(0.0, 100.0))
    }
}
