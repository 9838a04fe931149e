use crate::Snapshot;

/// Defines a minimization problem over a vector of solver variables.
///
/// A minimization problem maps solver variables to a model input, then
/// computes an objective value from the model input and output. Solvers
/// search for the variables that minimize the objective while staying inside
/// a [`FeasibleRegion`](crate::FeasibleRegion).
///
/// Solvers may evaluate the problem at points slightly outside the feasible
/// region (for example when estimating a gradient by finite differences), so
/// `input` should accept any finite `x` of the right length.
pub trait MinimizationProblem {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Maps solver variables (`x`) into a model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input cannot be constructed from `x`.
    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::Error>;

    /// Computes an objective value from model input/output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the objective cannot be computed.
    fn objective(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error>;

    /// Computes the objective value directly from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the objective cannot be computed.
    fn objective_from_snapshot(
        &self,
        snap: &Snapshot<Self::Input, Self::Output>,
    ) -> Result<f64, Self::Error> {
        self.objective(&snap.input, &snap.output)
    }
}
