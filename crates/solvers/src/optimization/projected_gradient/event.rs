use aggreblend_core::{MinimizationProblem, Model, Observer};

use crate::optimization::EvalError;

use super::Action;

/// Events emitted by the projected gradient solver.
///
/// Trial events carry `current`, the objective of the iterate the line search
/// started from. A trial is accepted only if it improves on `current` by the
/// Armijo margin, so observers can compare against it before steering the
/// search with [`Action::AssumeWorse`].
pub enum Event<'a, M, P>
where
    M: Model,
    P: MinimizationProblem<Input = M::Input, Output = M::Output>,
{
    /// Successful evaluation of a line-search trial point.
    Trial {
        /// Iteration the trial belongs to (starting at 1).
        iter: usize,

        /// The projected trial point.
        x: &'a [f64],

        /// Objective at the trial point.
        objective: f64,

        /// Objective at the current iterate.
        current: f64,

        /// The model input at this point.
        input: &'a M::Input,

        /// The model output at this point.
        output: &'a M::Output,
    },

    /// A trial point was accepted as the new iterate.
    Accepted {
        /// Iteration that produced this iterate (starting at 1).
        iter: usize,

        /// The new iterate.
        x: &'a [f64],

        /// Objective at the new iterate.
        objective: f64,

        /// Largest coordinate change from the previous iterate.
        step_norm: f64,

        /// The model input at this point.
        input: &'a M::Input,

        /// The model output at this point.
        output: &'a M::Output,
    },

    /// Model evaluation failed at a trial point.
    ModelFailed {
        iter: usize,

        /// The trial point where evaluation failed.
        x: &'a [f64],

        /// The model error.
        error: &'a M::Error,
    },

    /// Problem method failed at a trial point.
    ProblemFailed {
        iter: usize,

        /// The trial point where evaluation failed.
        x: &'a [f64],

        /// The problem error.
        error: &'a P::Error,
    },
}

impl<M, P> Event<'_, M, P>
where
    M: Model,
    P: MinimizationProblem<Input = M::Input, Output = M::Output>,
{
    /// Returns the iteration this event belongs to.
    #[must_use]
    pub fn iter(&self) -> usize {
        match self {
            Self::Trial { iter, .. }
            | Self::Accepted { iter, .. }
            | Self::ModelFailed { iter, .. }
            | Self::ProblemFailed { iter, .. } => *iter,
        }
    }

    /// Returns the point that was evaluated (or attempted).
    #[must_use]
    pub fn x(&self) -> &[f64] {
        match self {
            Self::Trial { x, .. }
            | Self::Accepted { x, .. }
            | Self::ModelFailed { x, .. }
            | Self::ProblemFailed { x, .. } => *x,
        }
    }

    /// Returns the objective at the point, or `f64::NAN` for failures.
    #[must_use]
    pub fn objective(&self) -> f64 {
        match self {
            Self::Trial { objective, .. } | Self::Accepted { objective, .. } => *objective,
            Self::ModelFailed { .. } | Self::ProblemFailed { .. } => f64::NAN,
        }
    }

    /// Emits a failure event and returns the observer's action.
    pub(super) fn emit_failure<Obs>(
        iter: usize,
        x: &[f64],
        error: &EvalError<M::Error, P::Error>,
        observer: &mut Obs,
    ) -> Option<Action>
    where
        Obs: for<'a> Observer<Event<'a, M, P>, Action>,
    {
        match error {
            EvalError::Model(e) => {
                let event = Event::ModelFailed { iter, x, error: e };
                observer.observe(&event)
            }
            EvalError::Problem(e) => {
                let event = Event::ProblemFailed { iter, x, error: e };
                observer.observe(&event)
            }
        }
    }
}
