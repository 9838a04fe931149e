use std::convert::Infallible;

use aggreblend_core::{FeasibleRegion, LinearConstraint, MinimizationProblem};

use crate::{
    curve::GradationCurve,
    metrics::combined_error,
    reference::ReferenceCurves,
    shilstone::{COARSE_FRACTION_MIN, FINE_FRACTION_LIMITS},
    sieve::Sieve,
};

use super::{OptimizeError, OptimizerConfig};

/// Scores a candidate blend by its combined error against the references.
///
/// Solver variables are the raw proportions, passed to the
/// [`Blender`](crate::blend::Blender) unchanged.
#[derive(Debug, Clone, Copy)]
pub struct BlendProblem {
    refs: ReferenceCurves,
    lambda: f64,
}

impl BlendProblem {
    #[must_use]
    pub fn new(refs: ReferenceCurves, lambda: f64) -> Self {
        Self { refs, lambda }
    }

    #[must_use]
    pub fn refs(&self) -> &ReferenceCurves {
        &self.refs
    }

    #[must_use]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl MinimizationProblem for BlendProblem {
    type Input = Vec<f64>;
    type Output = GradationCurve;
    type Error = Infallible;

    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::Error> {
        Ok(x.to_vec())
    }

    fn objective(&self, _input: &Self::Input, composite: &Self::Output) -> Result<f64, Self::Error> {
        Ok(combined_error(composite, &self.refs, self.lambda).combined)
    }
}

/// Builds the set of proportion vectors the search may accept.
///
/// Always bounds each proportion (to `[0, 1]` or the configured range) and
/// fixes the sum at 1. With Shilstone constraints enabled it also keeps the
/// share retained from #30 to #200 within its range and the share retained
/// from ¾" to #16 above its minimum. Both shares are linear in the proportions.
///
/// # Errors
///
/// Returns an error if the configured bounds do not match the curves.
pub fn feasible_region(
    curves: &[GradationCurve],
    config: &OptimizerConfig,
) -> Result<FeasibleRegion, OptimizeError> {
    let n = curves.len();
    let region = match config.bounds() {
        None => FeasibleRegion::unit_box(n),
        Some(bounds) if bounds.len() != n => {
            return Err(OptimizeError::BoundsLength {
                expected: n,
                actual: bounds.len(),
            });
        }
        Some(bounds) => FeasibleRegion::new(
            bounds.iter().map(|b| b.lower).collect(),
            bounds.iter().map(|b| b.upper).collect(),
        )?,
    }
    .with_sum(1.0)?;

    if !config.shilstone_constraints() {
        return Ok(region);
    }

    let fine = LinearConstraint::new(
        fraction_coefficients(curves, Sieve::No16, Sieve::No200),
        FINE_FRACTION_LIMITS.lower / 100.0,
        FINE_FRACTION_LIMITS.upper / 100.0,
    )?;
    let coarse = LinearConstraint::at_least(
        fraction_coefficients(curves, Sieve::OneInch, Sieve::No16),
        COARSE_FRACTION_MIN / 100.0,
    )?;

    Ok(region.with_constraint(fine)?.with_constraint(coarse)?)
}

/// Share of each aggregate passing `coarse` but retained on or above `fine`.
fn fraction_coefficients(curves: &[GradationCurve], coarse: Sieve, fine: Sieve) -> Vec<f64> {
    curves
        .iter()
        .map(|c| (c.percent_passing(coarse) - c.percent_passing(fine)) / 100.0)
        .collect()
}
