use std::time::Instant;

use aggreblend_core::{FeasibleRegion, MinimizationProblem, Model, Observer};

use crate::optimization::{Evaluation, evaluate};

use super::{
    Action, Config, Error, Event, Solution,
    gradient::central_difference,
    projection::{max_abs_diff, project},
    solution::Status,
    state::State,
};

/// Core projected gradient search implementation.
pub(super) fn search<M, P, Obs>(
    model: &M,
    problem: &P,
    region: &FeasibleRegion,
    x0: &[f64],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: MinimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M, P>, Action>,
{
    let dims = region.dims();
    if dims == 0 {
        return Err(Error::NoVariables);
    }
    if x0.len() != dims {
        return Err(Error::DimensionMismatch {
            expected: dims,
            actual: x0.len(),
        });
    }

    let clock = Instant::now();
    let mut state = init(model, problem, region, x0, config)?;

    for iter in 1..=config.max_iters() {
        if config
            .time_budget()
            .is_some_and(|budget| clock.elapsed() >= budget)
        {
            return Ok(state.into_solution(Status::TimeLimit, iter - 1));
        }

        // A unit projected-gradient step that barely moves means the current
        // point is stationary on the region.
        let unit = project(
            region,
            &descend(state.x(), state.gradient(), 1.0),
            config.projection_iters(),
        );
        if max_abs_diff(&unit.x, state.x()) <= config.step_tol() {
            return Ok(state.into_solution(Status::Converged, iter - 1));
        }

        let previous = state.objective();
        let outcome = line_search(
            model,
            problem,
            region,
            &mut state,
            iter,
            config,
            &mut observer,
        )?;
        let accepted = match outcome {
            LineSearch::Accepted(evaluation) => evaluation,
            LineSearch::Exhausted => {
                return Ok(state.into_solution(Status::Converged, iter - 1));
            }
            LineSearch::StopEarly => {
                return Ok(state.into_solution(Status::StoppedByObserver, iter - 1));
            }
        };

        let gradient = central_difference(model, problem, &accepted.x, config.fd_step())?;
        state.count_evaluations(2 * dims);

        let step_norm = max_abs_diff(&accepted.x, state.x());
        state.accept(accepted, gradient);

        let event = Event::Accepted {
            iter,
            x: state.x(),
            objective: state.objective(),
            step_norm,
            input: &state.snapshot().input,
            output: &state.snapshot().output,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(state.into_solution(Status::StoppedByObserver, iter));
        }

        let change = (previous - state.objective()).abs();
        if change <= config.objective_tol() * (1.0 + previous.abs()) {
            return Ok(state.into_solution(Status::Converged, iter));
        }
    }

    Ok(state.into_solution(Status::MaxIters, config.max_iters()))
}

/// Projects `x0`, evaluates it, and estimates the first gradient.
fn init<M, P>(
    model: &M,
    problem: &P,
    region: &FeasibleRegion,
    x0: &[f64],
    config: &Config,
) -> Result<State<M::Input, M::Output>, Error>
where
    M: Model,
    P: MinimizationProblem<Input = M::Input, Output = M::Output>,
{
    let start = project(region, x0, config.projection_iters());
    if !region.box_admits_total() || !start.is_feasible(config.feasibility_tol()) {
        return Err(Error::Infeasible {
            violation: start.violation,
        });
    }

    let first = evaluate(model, problem, &start.x)?;
    if !first.objective.is_finite() {
        return Err(Error::NonFiniteObjective);
    }

    let gradient = central_difference(model, problem, &first.x, config.fd_step())?;
    let evaluations = 1 + 2 * region.dims();

    Ok(State::new(first, gradient, evaluations))
}

enum LineSearch<I, O> {
    Accepted(Evaluation<I, O>),
    Exhausted,
    StopEarly,
}

/// Backtracks along the projection arc until the Armijo condition holds.
///
/// Each trial is `P(x - alpha * g)` with `alpha` halved after every rejection.
/// A trial is accepted only if its objective is finite, no worse than the
/// current objective, and below the Armijo line through the current point.
fn line_search<M, P, Obs>(
    model: &M,
    problem: &P,
    region: &FeasibleRegion,
    state: &mut State<M::Input, M::Output>,
    iter: usize,
    config: &Config,
    observer: &mut Obs,
) -> Result<LineSearch<M::Input, M::Output>, Error>
where
    M: Model,
    P: MinimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M, P>, Action>,
{
    let current = state.objective();
    let mut alpha = state.trial_step(config);

    for _ in 0..=config.max_backtracks() {
        let trial = project(
            region,
            &descend(state.x(), state.gradient(), alpha),
            config.projection_iters(),
        );
        alpha *= 0.5;

        if !trial.is_feasible(config.feasibility_tol()) {
            continue;
        }

        let slope: f64 = state
            .gradient()
            .iter()
            .zip(trial.x.iter().zip(state.x()))
            .map(|(g, (t, x))| g * (t - x))
            .sum();

        state.count_evaluations(1);
        let evaluation = match evaluate(model, problem, &trial.x) {
            Ok(evaluation) => evaluation,
            Err(error) => match Event::<M, P>::emit_failure(iter, &trial.x, &error, observer) {
                Some(Action::StopEarly) => return Ok(LineSearch::StopEarly),
                Some(Action::AssumeWorse) => continue,
                None => return Err(error.into()),
            },
        };

        let event = Event::Trial {
            iter,
            x: &evaluation.x,
            objective: evaluation.objective,
            current,
            input: &evaluation.snapshot.input,
            output: &evaluation.snapshot.output,
        };
        match observer.observe(&event) {
            Some(Action::StopEarly) => return Ok(LineSearch::StopEarly),
            Some(Action::AssumeWorse) => continue,
            None => {}
        }

        let objective = evaluation.objective;
        if objective.is_finite()
            && objective <= current
            && objective <= current + config.armijo() * slope
        {
            return Ok(LineSearch::Accepted(evaluation));
        }
    }

    Ok(LineSearch::Exhausted)
}

/// Returns `x - alpha * g`.
fn descend(x: &[f64], g: &[f64], alpha: f64) -> Vec<f64> {
    x.iter().zip(g).map(|(xi, gi)| xi - alpha * gi).collect()
}
