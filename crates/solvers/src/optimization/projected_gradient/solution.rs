use aggreblend_core::Snapshot;

/// Indicates why the projected gradient search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged according to the configured tolerances.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// Ran out of the configured wall-clock budget.
    TimeLimit,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a projected gradient search.
///
/// `x` is always the best accepted iterate and lies inside the feasible
/// region within the configured feasibility tolerance.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    /// Final solver status.
    pub status: Status,

    /// Best point found.
    pub x: Vec<f64>,

    /// Objective value at `x`.
    pub objective: f64,

    /// Snapshot at `x`.
    pub snapshot: Snapshot<I, O>,

    /// Number of accepted iterations.
    pub iters: usize,

    /// Total number of objective evaluations, including gradient probes.
    pub evaluations: usize,
}
