//! Solvers for constrained minimization problems.
//!
//! A [`MinimizationProblem`] maps solver variables `x: &[f64]` to model
//! inputs, calls the model, and extracts a scalar objective. Solvers in this
//! module search for the `x` that minimizes that objective inside a
//! [`FeasibleRegion`].
//!
//! # Solvers
//!
//! - [`projected_gradient`]: spectral projected gradient with exact
//!   projection onto linear constraints
//!
//! [`MinimizationProblem`]: aggreblend_core::MinimizationProblem
//! [`FeasibleRegion`]: aggreblend_core::FeasibleRegion

mod evaluate;

pub use evaluate::{EvalError, EvaluateResult, Evaluation, evaluate};

pub mod projected_gradient;
