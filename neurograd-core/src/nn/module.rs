use crate::error::NeurogradError;
use crate::value::{Operand, Value};

/// The base trait for all neural network modules (neurons, layers, containers).
///
/// Modules hold their parameters as leaf [`Value`]s of a single graph and
/// build new nodes in that graph each time `forward` runs.
pub trait Module: std::fmt::Debug {
    /// What one forward pass produces.
    type Output;

    /// Performs a forward pass.
    ///
    /// Inputs can be existing values or raw numbers; numbers are promoted to
    /// leaves of the module's graph.
    ///
    /// # Errors
    /// `DimensionMismatch` if `inputs.len()` does not equal the module's input
    /// width, `GraphMismatch` if an input value belongs to another graph.
    /// Both are checked before any node is built.
    fn forward<I>(&self, inputs: &[I]) -> Result<Self::Output, NeurogradError>
    where
        I: Clone + Into<Operand>;

    /// Returns all learnable parameters in a stable order.
    ///
    /// Optimizers rely on this order staying the same between calls.
    fn parameters(&self) -> Vec<Value>;

    /// Returns all learnable parameters along with hierarchical names
    /// (e.g. "layers.0.neurons.1.weight.2").
    fn named_parameters(&self) -> Vec<(String, Value)>;

    /// Resets the gradient of every parameter to 0.0.
    ///
    /// Gradients accumulate across reverse sweeps; call this before each
    /// new sweep.
    fn zero_grad(&self) {
        for param in self.parameters() {
            param.zero_grad();
        }
    }

    fn num_parameters(&self) -> usize {
        self.parameters().len()
    }
}

/// Prefixes each child parameter name with `prefix.`.
pub(crate) fn prefixed(prefix: &str, named: Vec<(String, Value)>) -> Vec<(String, Value)> {
    named
        .into_iter()
        .map(|(name, value)| (format!("{}.{}", prefix, name), value))
        .collect()
}
