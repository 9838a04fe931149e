use aggreblend_core::{MinimizationProblem, Model};

use crate::optimization::evaluate;

use super::Error;

/// Estimates the objective gradient at `x` by central differences.
///
/// Probe points are offset along one coordinate at a time and are not
/// projected, so the problem must accept points slightly outside the region.
///
/// # Errors
///
/// Returns an error if a probe evaluation fails or a component is not finite.
pub(super) fn central_difference<M, P>(
    model: &M,
    problem: &P,
    x: &[f64],
    step: f64,
) -> Result<Vec<f64>, Error>
where
    M: Model,
    P: MinimizationProblem<Input = M::Input, Output = M::Output>,
{
    let mut probe = x.to_vec();
    let mut gradient = Vec::with_capacity(x.len());

    for index in 0..x.len() {
        probe[index] = x[index] + step;
        let forward = evaluate(model, problem, &probe)?.objective;

        probe[index] = x[index] - step;
        let backward = evaluate(model, problem, &probe)?.objective;

        probe[index] = x[index];

        let component = (forward - backward) / (2.0 * step);
        if !component.is_finite() {
            return Err(Error::NonFiniteGradient { index });
        }
        gradient.push(component);
    }

    Ok(gradient)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use approx::assert_relative_eq;

    use super::*;

    struct Passthrough;

    impl Model for Passthrough {
        type Input = Vec<f64>;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, x: &Vec<f64>) -> Result<f64, Self::Error> {
            Ok(x[0] * x[0] + 3.0 * x[0] * x[1] - x[1])
        }
    }

    struct Output;

    impl MinimizationProblem for Output {
        type Input = Vec<f64>;
        type Output = f64;
        type Error = Infallible;

        fn input(&self, x: &[f64]) -> Result<Vec<f64>, Self::Error> {
            Ok(x.to_vec())
        }

        fn objective(&self, _input: &Vec<f64>, output: &f64) -> Result<f64, Self::Error> {
            Ok(*output)
        }
    }

    #[test]
    fn matches_analytic_gradient() {
        let gradient = central_difference(&Passthrough, &Output, &[0.5, 2.0], 1e-6).unwrap();

        // df/dx0 = 2 x0 + 3 x1, df/dx1 = 3 x0 - 1.
        assert_relative_eq!(gradient[0], 7.0, epsilon = 1e-6);
        assert_relative_eq!(gradient[1], 0.5, epsilon = 1e-6);
    }

    /// Undefined for `x[1] <= 0`.
    struct HalfPlane;

    impl Model for HalfPlane {
        type Input = Vec<f64>;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, x: &Vec<f64>) -> Result<f64, Self::Error> {
            Ok(x[0] + if x[1] > 0.0 { 0.0 } else { f64::NAN })
        }
    }

    #[test]
    fn reports_non_finite_component() {
        // Only the probes along x[1] cross into the undefined half.
        let result = central_difference(&HalfPlane, &Output, &[1.0, 1e-7], 1e-6);
        assert!(matches!(result, Err(Error::NonFiniteGradient { index: 1 })));
    }

    #[test]
    fn finite_side_is_unaffected() {
        let gradient = central_difference(&HalfPlane, &Output, &[1.0, 0.5], 1e-6).unwrap();
        assert_relative_eq!(gradient[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(gradient[1], 0.0);
    }
}
