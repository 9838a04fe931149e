use aggreblend_solvers::optimization::projected_gradient::{Action, Event};

use crate::{
    blend::Blender,
    metrics::{ErrorScore, combined_error},
};

use super::BlendProblem;

/// Records the error of every accepted iterate and logs its progress.
#[derive(Debug)]
pub(super) struct IterationLog {
    problem: BlendProblem,
    scores: Vec<ErrorScore>,
}

impl IterationLog {
    pub(super) fn new(problem: BlendProblem, initial: ErrorScore) -> Self {
        Self {
            problem,
            scores: vec![initial],
        }
    }

    pub(super) fn record(&mut self, event: &Event<'_, Blender, BlendProblem>) -> Option<Action> {
        if let Event::Accepted {
            iter,
            x,
            step_norm,
            output,
            ..
        } = event
        {
            let score = combined_error(output, self.problem.refs(), self.problem.lambda());
            tracing::debug!(
                iter,
                combined = score.combined,
                power45 = score.power45,
                tarantula = score.tarantula,
                step_norm,
                proportions = ?x,
                "accepted blend iterate"
            );
            self.scores.push(score);
        }
        None
    }

    /// Scores from the starting point through the last accepted iterate.
    pub(super) fn into_scores(self) -> Vec<ErrorScore> {
        self.scores
    }
}
