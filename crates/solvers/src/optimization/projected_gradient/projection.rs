use aggreblend_core::{FeasibleRegion, LinearConstraint};

/// Change in the iterate below which Dykstra cycles stop.
const CYCLE_TOL: f64 = 1e-14;

/// Violation below which a converged Dykstra iterate is considered exact.
const EXACT_TOL: f64 = 1e-12;

/// Bisection steps used to locate the shift for the box/total projection.
const SHIFT_BISECTIONS: usize = 200;

/// The result of projecting a point onto a [`FeasibleRegion`].
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// The projected point.
    pub x: Vec<f64>,

    /// Largest constraint violation remaining at `x`.
    ///
    /// This is near zero when the region is non-empty. A clearly positive
    /// value means the region admits no point.
    pub violation: f64,
}

impl Projection {
    /// Returns `true` if the projected point satisfies every constraint within `tol`.
    #[must_use]
    pub fn is_feasible(&self, tol: f64) -> bool {
        self.violation <= tol
    }
}

/// Projects `y` onto `region` in the Euclidean norm.
///
/// The box and total are handled together by shifting every coordinate by a
/// common amount and clamping, with the shift found by bisection. Linear
/// constraints are combined with that set through Dykstra's alternating
/// projections, running at most `max_cycles` cycles. The box/total set is
/// projected last in every cycle, so the returned point always satisfies it.
#[must_use]
pub fn project(region: &FeasibleRegion, y: &[f64], max_cycles: usize) -> Projection {
    let constraints = region.constraints();

    if constraints.is_empty() {
        let x = project_box_total(region, y);
        let violation = region.violation(&x);
        return Projection { x, violation };
    }

    let last = constraints.len();
    let mut x = y.to_vec();
    let mut increments = vec![vec![0.0; y.len()]; last + 1];

    for _ in 0..max_cycles.max(1) {
        let previous = x.clone();

        for (constraint, increment) in constraints.iter().zip(increments.iter_mut()) {
            let z = add(&x, increment);
            x = project_slab(constraint, &z);
            *increment = sub(&z, &x);
        }

        let z = add(&x, &increments[last]);
        x = project_box_total(region, &z);
        increments[last] = sub(&z, &x);

        let change = max_abs_diff(&previous, &x);
        if change <= CYCLE_TOL && region.violation(&x) <= EXACT_TOL {
            break;
        }
    }

    let violation = region.violation(&x);
    Projection { x, violation }
}

/// Projects onto `{ lower <= x <= upper, sum(x) == total }`.
///
/// Without a total this is a plain clamp. When the box cannot reach the
/// total, the nearest corner of the box is returned.
fn project_box_total(region: &FeasibleRegion, y: &[f64]) -> Vec<f64> {
    let lower = region.lower();
    let upper = region.upper();
    let clamp_shifted = |shift: f64| -> Vec<f64> {
        y.iter()
            .zip(lower.iter().zip(upper))
            .map(|(yi, (lo, hi))| (yi - shift).clamp(*lo, *hi))
            .collect()
    };

    let Some(total) = region.total() else {
        return clamp_shifted(0.0);
    };

    let min_total: f64 = lower.iter().sum();
    let max_total: f64 = upper.iter().sum();
    if total <= min_total {
        return lower.to_vec();
    }
    if total >= max_total {
        return upper.to_vec();
    }

    // The clamped sum is non-increasing in the shift: at `low` every
    // coordinate sits on its upper bound, at `high` on its lower bound.
    let mut low = y
        .iter()
        .zip(upper)
        .map(|(yi, hi)| yi - hi)
        .fold(f64::INFINITY, f64::min);
    let mut high = y
        .iter()
        .zip(lower)
        .map(|(yi, lo)| yi - lo)
        .fold(f64::NEG_INFINITY, f64::max);

    for _ in 0..SHIFT_BISECTIONS {
        let mid = 0.5 * (low + high);
        let sum: f64 = clamp_shifted(mid).iter().sum();
        if sum > total {
            low = mid;
        } else {
            high = mid;
        }
        if high - low <= f64::EPSILON * (1.0 + mid.abs()) {
            break;
        }
    }

    let mut x = clamp_shifted(0.5 * (low + high));

    // Spread the remaining rounding error over coordinates off their bounds.
    let residual = total - x.iter().sum::<f64>();
    let free: Vec<usize> = (0..x.len())
        .filter(|&i| x[i] > lower[i] && x[i] < upper[i])
        .collect();
    if !free.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let share = residual / free.len() as f64;
        for i in free {
            x[i] = (x[i] + share).clamp(lower[i], upper[i]);
        }
    }

    x
}

/// Projects onto `{ lower <= a · x <= upper }`.
///
/// A constraint with all-zero coefficients cannot be repaired by moving `x`,
/// so the point is returned unchanged and the violation check reports it.
fn project_slab(constraint: &LinearConstraint, z: &[f64]) -> Vec<f64> {
    let a = constraint.coefficients();
    let value = constraint.value(z);
    let target = value.clamp(constraint.lower(), constraint.upper());
    let norm_sq: f64 = a.iter().map(|ai| ai * ai).sum();

    if target == value || norm_sq == 0.0 {
        return z.to_vec();
    }

    let scale = (target - value) / norm_sq;
    z.iter().zip(a).map(|(zi, ai)| zi + scale * ai).collect()
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

pub(super) fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
