//! Numerical solvers for aggreblend.
//!
//! Solvers take a [`Model`], a problem that adapts solver variables to that
//! model, and an [`Observer`] that can watch or steer the iteration.
//!
//! [`Model`]: aggreblend_core::Model
//! [`Observer`]: aggreblend_core::Observer

pub mod optimization;
