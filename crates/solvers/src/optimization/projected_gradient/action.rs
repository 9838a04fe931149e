/// Actions an observer can take during projected gradient search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver early and return the current iterate.
    StopEarly,

    /// Reject this trial point as if it failed the sufficient-decrease test.
    ///
    /// The line search halves its step and tries again. Returning this from
    /// an [`Event::Accepted`](super::Event::Accepted) has no effect, since the
    /// point has already been accepted.
    ///
    /// Use this for:
    /// - Recovering from model or problem errors at a trial point.
    /// - Steering the search away from a region even when evaluation succeeded.
    AssumeWorse,
}
