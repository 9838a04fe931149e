//! Core traits and types for aggreblend.
//!
//! This crate defines the shared abstractions that the solvers and the
//! gradation domain build on:
//!
//! - [`Model`]: a callable that maps a typed input to a typed output
//! - [`Snapshot`]: a captured input/output pair from a model call
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`MinimizationProblem`]: adapts solver variables to model inputs and
//!   extracts an objective from outputs
//! - [`FeasibleRegion`]: the bounds, sum equality, and linear inequalities
//!   that every accepted solver iterate must satisfy

mod model;
mod observer;
mod problem;
mod region;

pub use model::{Model, Snapshot};
pub use observer::Observer;
pub use problem::MinimizationProblem;
pub use region::{FeasibleRegion, LinearConstraint, RegionError};
