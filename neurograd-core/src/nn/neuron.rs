use crate::autograd::graph::Graph;
use crate::error::NeurogradError;
use crate::nn::init;
use crate::nn::module::Module;
use crate::value::{Operand, Value};
use rand::Rng;

/// A single tanh unit: `tanh(bias + Σ xᵢ·wᵢ)`.
#[derive(Debug, Clone)]
pub struct Neuron {
    weights: Vec<Value>,
    bias: Value,
}

impl Neuron {
    /// Creates a neuron with `nin` weights, all parameters drawn from
    /// U(-1, 1) using `rng`.
    pub fn new<R: Rng + ?Sized>(graph: &Graph, nin: usize, rng: &mut R) -> Result<Self, NeurogradError> {
        let weights = (0..nin)
            .map(|_| {
                let w = graph.value(0.0);
                init::uniform_(&w, -1.0, 1.0, &mut *rng)?;
                Ok(w)
            })
            .collect::<Result<Vec<_>, NeurogradError>>()?;
        let bias = graph.value(0.0);
        init::uniform_(&bias, -1.0, 1.0, rng)?;
        Ok(Neuron { weights, bias })
    }

    /// Builds a neuron from existing leaves. All of them must belong to the
    /// graph of `bias`.
    pub fn from_parameters(weights: Vec<Value>, bias: Value) -> Result<Self, NeurogradError> {
        if weights.iter().any(|w| !w.graph().ptr_eq(bias.graph())) {
            return Err(NeurogradError::GraphMismatch {
                operation: "Neuron::from_parameters".to_string(),
            });
        }
        Ok(Neuron { weights, bias })
    }

    /// Number of inputs this neuron expects.
    pub fn nin(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[Value] {
        &self.weights
    }

    pub fn bias(&self) -> &Value {
        &self.bias
    }

    pub fn graph(&self) -> &Graph {
        self.bias.graph()
    }
}

/// Checks the input width and promotes every input into `graph`.
///
/// Nothing is added to the graph when the width is wrong.
pub(crate) fn resolve_inputs<I>(
    graph: &Graph,
    inputs: &[I],
    expected: usize,
    operation: &str,
) -> Result<Vec<Value>, NeurogradError>
where
    I: Clone + Into<Operand>,
{
    if inputs.len() != expected {
        return Err(NeurogradError::DimensionMismatch {
            expected,
            actual: inputs.len(),
            operation: operation.to_string(),
        });
    }
    let operands: Vec<Operand> = inputs.iter().cloned().map(Into::into).collect();
    let foreign = operands
        .iter()
        .any(|o| matches!(o, Operand::Node(v) if !v.graph().ptr_eq(graph)));
    if foreign {
        return Err(NeurogradError::GraphMismatch {
            operation: operation.to_string(),
        });
    }
    operands.into_iter().map(|o| o.resolve(graph, operation)).collect()
}

impl Module for Neuron {
    type Output = Value;

    fn forward<I>(&self, inputs: &[I]) -> Result<Value, NeurogradError>
    where
        I: Clone + Into<Operand>,
    {
        let xs = resolve_inputs(self.graph(), inputs, self.nin(), "Neuron::forward")?;
        let activation = xs
            .iter()
            .zip(&self.weights)
            .fold(self.bias.clone(), |acc, (x, w)| acc + x * w);
        Ok(activation.tanh())
    }

    fn parameters(&self) -> Vec<Value> {
        let mut params = self.weights.clone();
        params.push(self.bias.clone());
        params
    }

    fn named_parameters(&self) -> Vec<(String, Value)> {
        let mut named: Vec<(String, Value)> = self
            .weights
            .iter()
            .enumerate()
            .map(|(i, w)| (format!("weight.{}", i), w.clone()))
            .collect();
        named.push(("bias".to_string(), self.bias.clone()));
        named
    }
}

#[cfg(test)]
#[path = "neuron_test.rs"]
mod tests;
