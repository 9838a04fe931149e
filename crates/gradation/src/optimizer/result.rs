use crate::{blend::ProportionVector, curve::GradationCurve, metrics::ErrorScore};

/// How an optimization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum OptimizationStatus {
    /// The combined error or the projected step fell below the tolerance.
    Converged,

    /// The iteration or time budget ran out first.
    IterationLimitReached,

    /// No proportion vector satisfies every constraint.
    Infeasible,
}

/// The accepted blend and how it was reached.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult {
    pub status: OptimizationStatus,

    /// Best proportions found, clamped to `[0, 1]` and summing to 1.
    ///
    /// For [`OptimizationStatus::Infeasible`] this is the initial guess.
    pub proportions: ProportionVector,

    /// Errors of `composite` against the references.
    pub score: ErrorScore,

    /// The blend of the input curves at `proportions`.
    pub composite: GradationCurve,

    /// Number of accepted iterations.
    pub iterations: usize,

    /// Scores of the starting point and every accepted iterate, in order.
    pub history: Vec<ErrorScore>,
}
