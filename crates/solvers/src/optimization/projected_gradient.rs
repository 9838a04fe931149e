//! Spectral projected gradient search for linearly constrained minimization.
//!
//! # Algorithm
//!
//! Each iteration:
//!
//! 1. Estimates the gradient at the current point by central finite
//!    differences.
//! 2. Takes a trial step along the negative gradient, sized by the
//!    Barzilai–Borwein (spectral) rule once two iterates exist.
//! 3. Projects the trial point onto the [`FeasibleRegion`] and backtracks
//!    along the projection arc until the Armijo sufficient-decrease condition
//!    holds.
//!
//! The projection is exact (up to a small tolerance): the box and sum
//! equality are projected by bisection on a shift, and linear inequalities
//! are combined with it through Dykstra's alternating projections. Every
//! accepted iterate therefore satisfies all constraints, so constraints never
//! need to be folded into the objective as penalties.
//!
//! Accepted objectives never increase, so the returned point is never worse
//! than the (projected) starting point.
//!
//! # When to Use
//!
//! - The objective is smooth (or piecewise smooth) and cheap to evaluate
//! - Constraints are bounds, a fixed total, and linear inequalities
//! - The number of variables is small, since every gradient costs `2 * N`
//!   evaluations
//!
//! # Observer Events
//!
//! - [`Event::Trial`]: a line-search trial point was evaluated
//! - [`Event::Accepted`]: a trial point was accepted as the new iterate
//! - [`Event::ModelFailed`] / [`Event::ProblemFailed`]: a trial evaluation failed
//!
//! Observers can return [`Action::StopEarly`] to halt with the current
//! iterate, or [`Action::AssumeWorse`] on a trial (or failed trial) to reject
//! it and keep backtracking.

mod action;
mod config;
mod error;
mod event;
mod gradient;
mod projection;
mod search;
mod solution;
mod state;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use projection::{Projection, project};
pub use solution::{Solution, Status};

use aggreblend_core::{FeasibleRegion, MinimizationProblem, Model, Observer};

/// Finds a constrained minimum of the objective starting from `x0`.
///
/// `x0` does not need to be feasible; it is projected onto `region` first.
///
/// # Errors
///
/// Returns an error if the config is invalid, `x0` has the wrong length, the
/// region is empty, or the model or problem fails and the observer does not
/// return [`Action::AssumeWorse`] to recover.
pub fn minimize<M, P, Obs>(
    model: &M,
    problem: &P,
    region: &FeasibleRegion,
    x0: &[f64],
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: MinimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M, P>, Action>,
{
    search::search(model, problem, region, x0, config, observer)
}

/// Finds a constrained minimum without observer support.
///
/// This is a convenience wrapper around [`minimize`] that uses a no-op observer.
///
/// # Errors
///
/// Returns an error if the config is invalid, `x0` has the wrong length, the
/// region is empty, or the model or problem fails.
pub fn minimize_unobserved<M, P>(
    model: &M,
    problem: &P,
    region: &FeasibleRegion,
    x0: &[f64],
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: MinimizationProblem<Input = M::Input, Output = M::Output>,
{
    minimize(model, problem, region, x0, config, ())
}
