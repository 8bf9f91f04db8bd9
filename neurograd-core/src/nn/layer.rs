use crate::autograd::graph::Graph;
use crate::error::NeurogradError;
use crate::nn::module::{prefixed, Module};
use crate::nn::neuron::{resolve_inputs, Neuron};
use crate::value::{Operand, Value};
use rand::Rng;

/// Result of a layer's forward pass.
///
/// A single-neuron layer yields its output unwrapped, so a network ending in
/// one unit hands back a plain scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutput {
    Scalar(Value),
    Vector(Vec<Value>),
}

impl LayerOutput {
    pub fn len(&self) -> usize {
        match self {
            LayerOutput::Scalar(_) => 1,
            LayerOutput::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            LayerOutput::Scalar(value) => Some(value),
            LayerOutput::Vector(_) => None,
        }
    }

    pub fn into_scalar(self) -> Option<Value> {
        match self {
            LayerOutput::Scalar(value) => Some(value),
            LayerOutput::Vector(_) => None,
        }
    }

    /// Uniform view as a sequence, whatever the width.
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            LayerOutput::Scalar(value) => vec![value],
            LayerOutput::Vector(values) => values,
        }
    }
}

/// `nout` neurons, each fed the same inputs.
#[derive(Debug, Clone)]
pub struct Layer {
    neurons: Vec<Neuron>,
    nin: usize,
    graph: Graph,
}

impl Layer {
    /// Creates a layer mapping `nin` inputs to `nout` outputs.
    ///
    /// # Errors
    /// `InvalidArchitecture` if `nout` is zero.
    pub fn new<R: Rng + ?Sized>(
        graph: &Graph,
        nin: usize,
        nout: usize,
        rng: &mut R,
    ) -> Result<Self, NeurogradError> {
        if nout == 0 {
            return Err(NeurogradError::InvalidArchitecture(
                "a layer needs at least one neuron".to_string(),
            ));
        }
        let neurons = (0..nout)
            .map(|_| Neuron::new(graph, nin, &mut *rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Layer {
            neurons,
            nin,
            graph: graph.clone(),
        })
    }

    /// Builds a layer from existing neurons; they must share one input width
    /// and one graph.
    pub fn from_neurons(neurons: Vec<Neuron>) -> Result<Self, NeurogradError> {
        let first = neurons.first().ok_or_else(|| {
            NeurogradError::InvalidArchitecture("a layer needs at least one neuron".to_string())
        })?;
        let nin = first.nin();
        let graph = first.graph().clone();
        for neuron in &neurons {
            if neuron.nin() != nin {
                return Err(NeurogradError::DimensionMismatch {
                    expected: nin,
                    actual: neuron.nin(),
                    operation: "Layer::from_neurons".to_string(),
                });
            }
            if !neuron.graph().ptr_eq(&graph) {
                return Err(NeurogradError::GraphMismatch {
                    operation: "Layer::from_neurons".to_string(),
                });
            }
        }
        Ok(Layer { neurons, nin, graph })
    }

    pub fn nin(&self) -> usize {
        self.nin
    }

    pub fn nout(&self) -> usize {
        self.neurons.len()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

impl Module for Layer {
    type Output = LayerOutput;

    fn forward<I>(&self, inputs: &[I]) -> Result<LayerOutput, NeurogradError>
    where
        I: Clone + Into<Operand>,
    {
        // Promote once so literal inputs are shared by every neuron.
        let xs = resolve_inputs(&self.graph, inputs, self.nin, "Layer::forward")?;
        let mut outs = self
            .neurons
            .iter()
            .map(|neuron| neuron.forward(&xs))
            .collect::<Result<Vec<_>, _>>()?;
        if outs.len() == 1 {
            if let Some(out) = outs.pop() {
                return Ok(LayerOutput::Scalar(out));
            }
        }
        Ok(LayerOutput::Vector(outs))
    }

    fn parameters(&self) -> Vec<Value> {
        self.neurons.iter().flat_map(|n| n.parameters()).collect()
    }

    fn named_parameters(&self) -> Vec<(String, Value)> {
        self.neurons
            .iter()
            .enumerate()
            .flat_map(|(i, n)| prefixed(&format!("neurons.{}", i), n.named_parameters()))
            .collect()
    }
}

#[cfg(test)]
#[path = "layer_test.rs"]
mod tests;
