//! Linear feasible regions for constrained minimization.
//!
//! A [`FeasibleRegion`] is the intersection of:
//!
//! - a box: per-variable lower and upper bounds,
//! - an optional sum equality: `x[0] + x[1] + ... == total`,
//! - any number of two-sided [`LinearConstraint`]s: `lower <= a · x <= upper`.
//!
//! Every set in this intersection is convex, so the region is convex and
//! solvers can project onto it exactly. The region is only a description;
//! projection lives with the solvers.
//!
//! # Example
//!
//! ```
//! use aggreblend_core::{FeasibleRegion, LinearConstraint};
//!
//! let region = FeasibleRegion::unit_box(3)
//!     .with_sum(1.0)
//!     .unwrap()
//!     .with_constraint(LinearConstraint::at_least(vec![1.0, 0.0, 0.0], 0.2).unwrap())
//!     .unwrap();
//!
//! assert!(region.is_feasible(&[0.4, 0.3, 0.3], 1e-12));
//! assert!(!region.is_feasible(&[0.1, 0.6, 0.3], 1e-12));
//! ```

use thiserror::Error;

/// Errors that can occur when describing a feasible region.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RegionError {
    #[error("expected {expected} coefficients, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("lower bound exceeds upper bound at index {index}")]
    InvertedBounds { index: usize },

    #[error("constraint lower limit {lower} exceeds upper limit {upper}")]
    InvertedLimits { lower: f64, upper: f64 },

    #[error("bounds, totals, and coefficients must not be NaN")]
    NotANumber,

    #[error("coefficients and totals must be finite")]
    NonFinite,
}

/// A two-sided linear inequality `lower <= coefficients · x <= upper`.
///
/// Either limit may be infinite to express a one-sided constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    coefficients: Vec<f64>,
    lower: f64,
    upper: f64,
}

impl LinearConstraint {
    /// Creates a two-sided constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is not finite, a limit is NaN, or
    /// `lower > upper`.
    pub fn new(coefficients: Vec<f64>, lower: f64, upper: f64) -> Result<Self, RegionError> {
        if lower.is_nan() || upper.is_nan() {
            return Err(RegionError::NotANumber);
        }
        if coefficients.iter().any(|a| !a.is_finite()) {
            return Err(RegionError::NonFinite);
        }
        if lower > upper {
            return Err(RegionError::InvertedLimits { lower, upper });
        }
        Ok(Self {
            coefficients,
            lower,
            upper,
        })
    }

    /// Creates the one-sided constraint `coefficients · x >= lower`.
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is not finite or `lower` is NaN.
    pub fn at_least(coefficients: Vec<f64>, lower: f64) -> Result<Self, RegionError> {
        Self::new(coefficients, lower, f64::INFINITY)
    }

    /// Creates the one-sided constraint `coefficients · x <= upper`.
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is not finite or `upper` is NaN.
    pub fn at_most(coefficients: Vec<f64>, upper: f64) -> Result<Self, RegionError> {
        Self::new(coefficients, f64::NEG_INFINITY, upper)
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Returns `coefficients · x`.
    #[must_use]
    pub fn value(&self, x: &[f64]) -> f64 {
        self.coefficients.iter().zip(x).map(|(a, xi)| a * xi).sum()
    }

    /// Returns how far `a · x` lies outside `[lower, upper]`, or zero.
    #[must_use]
    pub fn violation(&self, x: &[f64]) -> f64 {
        let v = self.value(x);
        if v < self.lower {
            self.lower - v
        } else if v > self.upper {
            v - self.upper
        } else {
            0.0
        }
    }
}

/// The set of points a constrained solver is allowed to accept.
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibleRegion {
    lower: Vec<f64>,
    upper: Vec<f64>,
    total: Option<f64>,
    constraints: Vec<LinearConstraint>,
}

impl FeasibleRegion {
    /// Creates a box-bounded region.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound vectors differ in length, contain NaN,
    /// or have a lower bound above its upper bound.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, RegionError> {
        if lower.len() != upper.len() {
            return Err(RegionError::DimensionMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }
        for (index, (lo, hi)) in lower.iter().zip(&upper).enumerate() {
            if lo.is_nan() || hi.is_nan() {
                return Err(RegionError::NotANumber);
            }
            if lo > hi {
                return Err(RegionError::InvertedBounds { index });
            }
        }
        Ok(Self {
            lower,
            upper,
            total: None,
            constraints: Vec::new(),
        })
    }

    /// Creates the box `[0, 1]^dims`.
    #[must_use]
    pub fn unit_box(dims: usize) -> Self {
        Self {
            lower: vec![0.0; dims],
            upper: vec![1.0; dims],
            total: None,
            constraints: Vec::new(),
        }
    }

    /// Adds the equality `sum(x) == total`.
    ///
    /// # Errors
    ///
    /// Returns an error if `total` is not finite.
    pub fn with_sum(mut self, total: f64) -> Result<Self, RegionError> {
        if !total.is_finite() {
            return Err(RegionError::NonFinite);
        }
        self.total = Some(total);
        Ok(self)
    }

    /// Adds a linear inequality constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if the constraint has the wrong number of coefficients.
    pub fn with_constraint(mut self, constraint: LinearConstraint) -> Result<Self, RegionError> {
        if constraint.coefficients.len() != self.dims() {
            return Err(RegionError::DimensionMismatch {
                expected: self.dims(),
                actual: constraint.coefficients.len(),
            });
        }
        self.constraints.push(constraint);
        Ok(self)
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.lower.len()
    }

    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Returns the required sum of all variables, if any.
    #[must_use]
    pub fn total(&self) -> Option<f64> {
        self.total
    }

    #[must_use]
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Returns `false` when the box alone cannot reach the required sum.
    ///
    /// This is a cheap necessary condition for feasibility. A region that
    /// passes it can still be empty once linear constraints are added.
    #[must_use]
    pub fn box_admits_total(&self) -> bool {
        match self.total {
            None => true,
            Some(total) => {
                let min: f64 = self.lower.iter().sum();
                let max: f64 = self.upper.iter().sum();
                min <= total && total <= max
            }
        }
    }

    /// Returns the largest violation of any constraint at `x`.
    ///
    /// Zero means `x` is inside the region. A length mismatch is reported as
    /// an infinite violation.
    #[must_use]
    pub fn violation(&self, x: &[f64]) -> f64 {
        if x.len() != self.dims() {
            return f64::INFINITY;
        }

        let bounds = x
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(xi, (lo, hi))| (lo - xi).max(xi - hi).max(0.0))
            .fold(0.0, f64::max);

        let sum = self
            .total
            .map_or(0.0, |total| (x.iter().sum::<f64>() - total).abs());

        let linear = self
            .constraints
            .iter()
            .map(|c| c.violation(x))
            .fold(0.0, f64::max);

        bounds.max(sum).max(linear)
    }

    /// Returns `true` if every constraint holds at `x` within `tol`.
    #[must_use]
    pub fn is_feasible(&self, x: &[f64], tol: f64) -> bool {
        self.violation(x) <= tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn inverted_bounds_are_rejected() {
        let result = FeasibleRegion::new(vec![0.0, 0.6], vec![1.0, 0.5]);
        assert_eq!(result, Err(RegionError::InvertedBounds { index: 1 }));
    }

    #[test]
    fn mismatched_bound_lengths_are_rejected() {
        let result = FeasibleRegion::new(vec![0.0], vec![1.0, 1.0]);
        assert!(matches!(
            result,
            Err(RegionError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn constraint_length_must_match_dims() {
        let constraint = LinearConstraint::at_most(vec![1.0, 1.0], 0.5).unwrap();
        let result = FeasibleRegion::unit_box(3).with_constraint(constraint);
        assert!(matches!(
            result,
            Err(RegionError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn violation_reports_worst_constraint() {
        let region = FeasibleRegion::unit_box(2)
            .with_sum(1.0)
            .unwrap()
            .with_constraint(LinearConstraint::new(vec![1.0, 0.0], 0.2, 0.4).unwrap())
            .unwrap();

        assert_relative_eq!(region.violation(&[0.3, 0.7]), 0.0);
        // Sum is off by 0.1, first variable exceeds its limit by 0.3.
        assert_relative_eq!(region.violation(&[0.7, 0.4]), 0.3, epsilon = 1e-12);
        // Negative value violates the box.
        assert_relative_eq!(region.violation(&[-0.25, 1.25]), 0.45, epsilon = 1e-12);
    }

    #[test]
    fn box_admits_total_detects_unreachable_sum() {
        let region = FeasibleRegion::new(vec![0.6, 0.6], vec![1.0, 1.0])
            .unwrap()
            .with_sum(1.0)
            .unwrap();
        assert!(!region.box_admits_total());

        let region = FeasibleRegion::unit_box(2).with_sum(1.0).unwrap();
        assert!(region.box_admits_total());
    }

    #[test]
    fn one_sided_constraints_use_infinite_limits() {
        let c = LinearConstraint::at_least(vec![1.0], 0.15).unwrap();
        assert!(c.upper().is_infinite());
        assert_relative_eq!(c.violation(&[0.1]), 0.05, epsilon = 1e-12);
        assert_relative_eq!(c.violation(&[100.0]), 0.0);
    }
}
