use crate::error::NeurogradError;

/// Trait defining the common interface for all optimizers.
///
/// Optimizers own handles to the parameters they update and read the
/// gradients left on them by the last reverse sweep.
pub trait Optimizer {
    /// Performs a single optimization step.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the step was successful, or a `NeurogradError` otherwise.
    fn step(&mut self) -> Result<(), NeurogradError>;

    /// Clears the gradients of all parameters managed by the optimizer.
    ///
    /// Gradients accumulate across sweeps, so this is called before the
    /// backward pass of every training iteration.
    fn zero_grad(&mut self);
}
