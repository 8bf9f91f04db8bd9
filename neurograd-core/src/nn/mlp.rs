use crate::autograd::graph::Graph;
use crate::error::NeurogradError;
use crate::nn::layer::{Layer, LayerOutput};
use crate::nn::module::{prefixed, Module};
use crate::value::{Operand, Value};
use log::debug;
use rand::Rng;

/// Multi-layer perceptron: a stack of tanh [`Layer`]s.
///
/// Built from an input width and the widths of every layer, e.g.
/// `Mlp::new(&graph, 3, &[4, 4, 1], &mut rng)` has sizes `[3, 4, 4, 1]`.
#[derive(Debug, Clone)]
pub struct Mlp {
    layers: Vec<Layer>,
    graph: Graph,
}

impl Mlp {
    /// # Errors
    /// `InvalidArchitecture` if `nouts` is empty or any width is zero.
    pub fn new<R: Rng + ?Sized>(
        graph: &Graph,
        nin: usize,
        nouts: &[usize],
        rng: &mut R,
    ) -> Result<Self, NeurogradError> {
        if nouts.is_empty() {
            return Err(NeurogradError::InvalidArchitecture(
                "an MLP needs at least one layer".to_string(),
            ));
        }
        let sizes: Vec<usize> = std::iter::once(nin).chain(nouts.iter().copied()).collect();
        if let Some(pos) = sizes.iter().position(|&s| s == 0) {
            return Err(NeurogradError::InvalidArchitecture(format!(
                "layer widths must be positive, got {:?} (zero at position {})",
                sizes, pos
            )));
        }

        let layers = sizes
            .windows(2)
            .map(|w| Layer::new(graph, w[0], w[1], &mut *rng))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Mlp::new: sizes {:?}, {} layers", sizes, layers.len());
        Ok(Mlp {
            layers,
            graph: graph.clone(),
        })
    }

    /// Stacks existing layers; consecutive widths must match.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, NeurogradError> {
        let first = layers.first().ok_or_else(|| {
            NeurogradError::InvalidArchitecture("an MLP needs at least one layer".to_string())
        })?;
        let graph = first.graph().clone();
        for pair in layers.windows(2) {
            if pair[0].nout() != pair[1].nin() {
                return Err(NeurogradError::DimensionMismatch {
                    expected: pair[0].nout(),
                    actual: pair[1].nin(),
                    operation: "Mlp::from_layers".to_string(),
                });
            }
        }
        if layers.iter().any(|l| !l.graph().ptr_eq(&graph)) {
            return Err(NeurogradError::GraphMismatch {
                operation: "Mlp::from_layers".to_string(),
            });
        }
        Ok(Mlp { layers, graph })
    }

    pub fn nin(&self) -> usize {
        self.layers[0].nin()
    }

    /// `[nin, h1, ..., nout]`.
    pub fn sizes(&self) -> Vec<usize> {
        std::iter::once(self.nin())
            .chain(self.layers.iter().map(|l| l.nout()))
            .collect()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

impl Module for Mlp {
    type Output = LayerOutput;

    fn forward<I>(&self, inputs: &[I]) -> Result<LayerOutput, NeurogradError>
    where
        I: Clone + Into<Operand>,
    {
        let (first, rest) = match self.layers.split_first() {
            Some(split) => split,
            None => {
                return Err(NeurogradError::InvalidArchitecture(
                    "an MLP needs at least one layer".to_string(),
                ))
            }
        };
        let mut out = first.forward(inputs)?;
        for layer in rest {
            out = layer.forward(&out.into_vec())?;
        }
        Ok(out)
    }

    fn parameters(&self) -> Vec<Value> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    fn named_parameters(&self) -> Vec<(String, Value)> {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(i, l)| prefixed(&format!("layers.{}", i), l.named_parameters()))
            .collect()
    }
}

#[cfg(test)]
#[path = "mlp_test.rs"]
mod tests;
