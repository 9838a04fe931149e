use aggreblend_core::Snapshot;

use crate::optimization::Evaluation;

use super::{Config, Solution, Status};

/// Bounds on the spectral step length.
const MIN_SPECTRAL_STEP: f64 = 1e-10;
const MAX_SPECTRAL_STEP: f64 = 1e10;

/// The previous iterate and its gradient, kept for the spectral step.
struct Previous {
    x: Vec<f64>,
    gradient: Vec<f64>,
}

pub(super) struct State<I, O> {
    x: Vec<f64>,
    objective: f64,
    snapshot: Snapshot<I, O>,
    gradient: Vec<f64>,
    previous: Option<Previous>,
    evaluations: usize,
}

impl<I, O> State<I, O> {
    pub(super) fn new(evaluation: Evaluation<I, O>, gradient: Vec<f64>, evaluations: usize) -> Self {
        Self {
            x: evaluation.x,
            objective: evaluation.objective,
            snapshot: evaluation.snapshot,
            gradient,
            previous: None,
            evaluations,
        }
    }

    pub(super) fn x(&self) -> &[f64] {
        &self.x
    }

    pub(super) fn objective(&self) -> f64 {
        self.objective
    }

    pub(super) fn snapshot(&self) -> &Snapshot<I, O> {
        &self.snapshot
    }

    pub(super) fn gradient(&self) -> &[f64] {
        &self.gradient
    }

    pub(super) fn count_evaluations(&mut self, count: usize) {
        self.evaluations += count;
    }

    /// Returns the step length for the next trial point.
    ///
    /// Uses the Barzilai–Borwein ratio `s·s / s·y` once a previous iterate
    /// exists and the curvature along `s` is positive. Otherwise the step is
    /// scaled so the largest coordinate moves by `initial_step`.
    pub(super) fn trial_step(&self, config: &Config) -> f64 {
        if let Some(previous) = &self.previous {
            let (ss, sy) = self
                .x
                .iter()
                .zip(&previous.x)
                .zip(self.gradient.iter().zip(&previous.gradient))
                .fold((0.0, 0.0), |(ss, sy), ((x, px), (g, pg))| {
                    let s = x - px;
                    let y = g - pg;
                    (ss + s * s, sy + s * y)
                });

            if sy > 0.0 && ss > 0.0 {
                return (ss / sy).clamp(MIN_SPECTRAL_STEP, MAX_SPECTRAL_STEP);
            }
        }

        let largest = self.gradient.iter().fold(0.0_f64, |m, g| m.max(g.abs()));
        if largest > 0.0 {
            config.initial_step() / largest
        } else {
            config.initial_step()
        }
    }

    /// Moves to an accepted trial point.
    pub(super) fn accept(&mut self, evaluation: Evaluation<I, O>, gradient: Vec<f64>) {
        let x = std::mem::replace(&mut self.x, evaluation.x);
        let previous_gradient = std::mem::replace(&mut self.gradient, gradient);
        self.previous = Some(Previous {
            x,
            gradient: previous_gradient,
        });
        self.objective = evaluation.objective;
        self.snapshot = evaluation.snapshot;
    }

    pub(super) fn into_solution(self, status: Status, iters: usize) -> Solution<I, O> {
        Solution {
            status,
            x: self.x,
            objective: self.objective,
            snapshot: self.snapshot,
            iters,
            evaluations: self.evaluations,
        }
    }
}
