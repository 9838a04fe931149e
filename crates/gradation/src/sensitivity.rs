//! How the Power-45 error responds to small changes in each proportion.

use thiserror::Error;

use crate::{
    blend::{InvalidProportionsError, ProportionVector, blend},
    curve::GradationCurve,
    metrics::power45_error,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensitivityError {
    #[error("perturbation must be finite and in (0, 1], got {0}")]
    Delta(f64),

    #[error(transparent)]
    Proportions(#[from] InvalidProportionsError),
}

/// One perturbed blend.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Perturbation {
    /// Index of the aggregate that was changed.
    pub aggregate: usize,
    /// Signed change applied before clamping and renormalizing.
    pub delta: f64,
    pub proportions: ProportionVector,
    pub power45: f64,
    /// `power45` minus the error of the unperturbed blend.
    pub change: f64,
}

/// Perturbs each proportion by `+delta` and `-delta` in turn.
///
/// The opposite change is spread evenly over the other aggregates, then the
/// vector is clamped to `[0, 1]` and rescaled to sum to 1. Results come in
/// aggregate order, the increase before the decrease.
///
/// # Errors
///
/// Returns an error if `delta` is not in `(0, 1]` or the proportions do not
/// match the curves.
pub fn sensitivity(
    curves: &[GradationCurve],
    proportions: &ProportionVector,
    ideal: &GradationCurve,
    delta: f64,
) -> Result<Vec<Perturbation>, SensitivityError> {
    if !delta.is_finite() || delta <= 0.0 || delta > 1.0 {
        return Err(SensitivityError::Delta(delta));
    }
    let base = power45_error(&blend(curves, proportions)?, ideal);

    let n = proportions.len();
    #[allow(clippy::cast_precision_loss)]
    let others = n.saturating_sub(1).max(1) as f64;

    let mut results = Vec::with_capacity(2 * n);
    for aggregate in 0..n {
        for signed in [delta, -delta] {
            let shifted: Vec<f64> = proportions
                .as_slice()
                .iter()
                .enumerate()
                .map(|(j, p)| {
                    if j == aggregate {
                        p + signed
                    } else {
                        p - signed / others
                    }
                })
                .collect();

            let perturbed = ProportionVector::normalized(&shifted)?;
            let power45 = power45_error(&blend(curves, &perturbed)?, ideal);
            results.push(Perturbation {
                aggregate,
                delta: signed,
                proportions: perturbed,
                power45,
                change: power45 - base,
            });
        }
    }
    Ok(results)
}
