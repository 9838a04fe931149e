use std::{convert::Infallible, time::Duration};

use approx::assert_relative_eq;
use thiserror::Error;

use aggreblend_core::{FeasibleRegion, LinearConstraint, MinimizationProblem, Model};

use super::{Action, Config, Error, Event, Status, minimize, minimize_unobserved};

/// Squared distance to a fixed target: f(x) = Σ (x_i - t_i)².
struct Distance {
    target: Vec<f64>,
}

impl Model for Distance {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = Infallible;

    fn call(&self, x: &Vec<f64>) -> Result<f64, Self::Error> {
        Ok(x
            .iter()
            .zip(&self.target)
            .map(|(xi, ti)| (xi - ti).powi(2))
            .sum())
    }
}

/// Objective: just use the model output as the objective.
struct ObjectiveOutput;

impl MinimizationProblem for ObjectiveOutput {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = Infallible;

    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::Error> {
        Ok(x.to_vec())
    }

    fn objective(&self, _input: &Vec<f64>, output: &f64) -> Result<f64, Self::Error> {
        Ok(*output)
    }
}

fn simplex(dims: usize) -> FeasibleRegion {
    FeasibleRegion::unit_box(dims).with_sum(1.0).unwrap()
}

fn tight() -> Config {
    Config::new(500, 1e-14, 1e-12).unwrap()
}

#[test]
fn finds_interior_minimum_on_simplex() {
    let model = Distance {
        target: vec![0.5, 0.3, 0.2],
    };

    let solution =
        minimize_unobserved(&model, &ObjectiveOutput, &simplex(3), &[1.0, 0.0, 0.0], &tight())
            .expect("should converge");

    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(solution.x[0], 0.5, epsilon = 1e-6);
    assert_relative_eq!(solution.x[1], 0.3, epsilon = 1e-6);
    assert_relative_eq!(solution.x[2], 0.2, epsilon = 1e-6);
    assert!(solution.objective < 1e-10);
}

#[test]
fn target_outside_region_lands_on_its_projection() {
    let model = Distance {
        target: vec![1.0, 1.0, 0.0],
    };

    let solution = minimize_unobserved(
        &model,
        &ObjectiveOutput,
        &simplex(3),
        &[0.2, 0.2, 0.6],
        &tight(),
    )
    .expect("should converge");

    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(solution.x[0], 0.5, epsilon = 1e-6);
    assert_relative_eq!(solution.x[1], 0.5, epsilon = 1e-6);
    assert_relative_eq!(solution.x[2], 0.0, epsilon = 1e-6);
}

#[test]
fn linear_constraint_is_active_at_solution() {
    let model = Distance {
        target: vec![0.5, 0.3, 0.2],
    };
    let region = simplex(3)
        .with_constraint(LinearConstraint::at_least(vec![1.0, 0.0, 0.0], 0.7).unwrap())
        .unwrap();

    let solution =
        minimize_unobserved(&model, &ObjectiveOutput, &region, &[0.8, 0.1, 0.1], &tight())
            .expect("should converge");

    assert!(region.is_feasible(&solution.x, 1e-7));
    assert_relative_eq!(solution.x[0], 0.7, epsilon = 1e-5);
    assert_relative_eq!(solution.x[1], 0.2, epsilon = 1e-5);
    assert_relative_eq!(solution.x[2], 0.1, epsilon = 1e-5);
}

#[test]
fn infeasible_x0_is_projected_first() {
    let model = Distance {
        target: vec![0.5, 0.5],
    };

    let solution = minimize_unobserved(
        &model,
        &ObjectiveOutput,
        &simplex(2),
        &[3.0, -2.0],
        &tight(),
    )
    .expect("should converge");

    assert!(simplex(2).is_feasible(&solution.x, 1e-9));
    assert_relative_eq!(solution.x[0], 0.5, epsilon = 1e-6);
}

#[test]
fn unreachable_total_is_infeasible() {
    let model = Distance {
        target: vec![0.5, 0.5],
    };
    let region = FeasibleRegion::new(vec![0.6, 0.6], vec![1.0, 1.0])
        .unwrap()
        .with_sum(1.0)
        .unwrap();

    let result = minimize_unobserved(
        &model,
        &ObjectiveOutput,
        &region,
        &[0.5, 0.5],
        &Config::default(),
    );

    assert!(matches!(result, Err(Error::Infeasible { .. })));
}

#[test]
fn contradictory_constraints_are_infeasible() {
    let model = Distance {
        target: vec![0.5, 0.5],
    };
    let region = simplex(2)
        .with_constraint(LinearConstraint::at_least(vec![1.0, 0.0], 0.7).unwrap())
        .unwrap()
        .with_constraint(LinearConstraint::at_least(vec![0.0, 1.0], 0.5).unwrap())
        .unwrap();

    let result = minimize_unobserved(
        &model,
        &ObjectiveOutput,
        &region,
        &[0.5, 0.5],
        &Config::default(),
    );

    match result {
        Err(Error::Infeasible { violation }) => assert!(violation > 1e-3),
        other => panic!("expected infeasible, got {other:?}"),
    }
}

#[test]
fn rejects_wrong_x0_length() {
    let model = Distance {
        target: vec![0.5, 0.5],
    };

    let result = minimize_unobserved(
        &model,
        &ObjectiveOutput,
        &simplex(2),
        &[1.0],
        &Config::default(),
    );

    assert!(matches!(
        result,
        Err(Error::DimensionMismatch {
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn accepted_objectives_never_increase() {
    let model = Distance {
        target: vec![0.1, 0.6, 0.2, 0.1],
    };

    let mut objectives = Vec::new();
    let observer = |event: &Event<'_, _, _>| {
        if let Event::Accepted { objective, .. } = event {
            objectives.push(*objective);
        }
        None
    };

    let solution = minimize(
        &model,
        &ObjectiveOutput,
        &simplex(4),
        &[0.7, 0.1, 0.1, 0.1],
        &tight(),
        observer,
    )
    .expect("should converge");

    assert!(!objectives.is_empty());
    assert!(objectives.windows(2).all(|pair| pair[1] <= pair[0]));
    assert_relative_eq!(solution.objective, *objectives.last().unwrap());
}

#[test]
fn observer_can_stop_early() {
    let model = Distance {
        target: vec![0.5, 0.3, 0.2],
    };

    let observer = |event: &Event<'_, _, _>| match event {
        Event::Accepted { .. } => Some(Action::StopEarly),
        _ => None,
    };

    let solution = minimize(
        &model,
        &ObjectiveOutput,
        &simplex(3),
        &[1.0, 0.0, 0.0],
        &tight(),
        observer,
    )
    .expect("should stop cleanly");

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.iters, 1);
}

#[test]
fn rejecting_every_trial_keeps_starting_point() {
    let model = Distance {
        target: vec![0.5, 0.3, 0.2],
    };

    let mut trials = 0;
    let observer = |event: &Event<'_, _, _>| match event {
        Event::Trial { .. } => {
            trials += 1;
            Some(Action::AssumeWorse)
        }
        _ => None,
    };

    let x0 = [0.2, 0.2, 0.6];
    let solution = minimize(
        &model,
        &ObjectiveOutput,
        &simplex(3),
        &x0,
        &Config::default(),
        observer,
    )
    .expect("should complete");

    assert_eq!(solution.iters, 0);
    assert_eq!(trials, Config::default().max_backtracks() + 1);
    for (x, expected) in solution.x.iter().zip(x0) {
        assert_relative_eq!(*x, expected, epsilon = 1e-12);
    }
}

#[test]
fn iteration_limit_is_reported() {
    let model = Distance {
        target: vec![0.5, 0.3, 0.2],
    };
    let config = Config::new(1, 1e-14, 1e-12).unwrap();

    let solution = minimize_unobserved(
        &model,
        &ObjectiveOutput,
        &simplex(3),
        &[1.0, 0.0, 0.0],
        &config,
    )
    .expect("should complete");

    assert_eq!(solution.status, Status::MaxIters);
    assert_eq!(solution.iters, 1);
    // First step moves the largest coordinate by the initial step.
    assert_relative_eq!(solution.x[0], 0.9, epsilon = 1e-6);
}

#[test]
fn zero_time_budget_returns_starting_point() {
    let model = Distance {
        target: vec![0.5, 0.3, 0.2],
    };
    let config = Config::default().with_time_budget(Duration::ZERO);

    let solution = minimize_unobserved(
        &model,
        &ObjectiveOutput,
        &simplex(3),
        &[1.0, 0.0, 0.0],
        &config,
    )
    .expect("should complete");

    assert_eq!(solution.status, Status::TimeLimit);
    assert_eq!(solution.iters, 0);
    assert_relative_eq!(solution.x[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(solution.x[1], 0.0, epsilon = 1e-12);
}

#[test]
fn repeated_runs_are_identical() {
    let model = Distance {
        target: vec![0.1, 0.6, 0.2, 0.1],
    };
    let run = || {
        minimize_unobserved(
            &model,
            &ObjectiveOutput,
            &simplex(4),
            &[0.25; 4],
            &Config::default(),
        )
        .expect("should converge")
    };

    let first = run();
    let second = run();

    assert_eq!(first.x, second.x);
    assert_eq!(first.iters, second.iters);
    assert_eq!(first.evaluations, second.evaluations);
}

#[derive(Debug, Error)]
#[error("x[0] = {0} is above the threshold")]
struct AboveThreshold(f64);

/// Model that fails when the first variable exceeds a threshold.
struct ThresholdModel {
    threshold: f64,
}

impl Model for ThresholdModel {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = AboveThreshold;

    fn call(&self, x: &Vec<f64>) -> Result<f64, Self::Error> {
        if x[0] > self.threshold {
            return Err(AboveThreshold(x[0]));
        }
        Ok((x[0] - 1.0).powi(2) + x[1].powi(2))
    }
}

#[test]
fn trial_failure_without_observer_is_an_error() {
    let model = ThresholdModel { threshold: 0.55 };

    let result = minimize_unobserved(
        &model,
        &ObjectiveOutput,
        &simplex(2),
        &[0.5, 0.5],
        &Config::default(),
    );

    assert!(matches!(result, Err(Error::Model(_))));
}

#[test]
fn observer_sees_trial_failures() {
    let model = ThresholdModel { threshold: 0.55 };

    let mut failures = 0;
    let observer = |event: &Event<'_, _, _>| match event {
        Event::ModelFailed { .. } => {
            failures += 1;
            Some(Action::StopEarly)
        }
        _ => None,
    };

    let solution = minimize(
        &model,
        &ObjectiveOutput,
        &simplex(2),
        &[0.5, 0.5],
        &Config::default(),
        observer,
    )
    .expect("should stop cleanly");

    assert_eq!(failures, 1);
    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.iters, 0);
    assert_relative_eq!(solution.x[0], 0.5, epsilon = 1e-12);
}
